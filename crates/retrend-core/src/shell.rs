//! Top-level chrome: reachability, session gating, badges, and the factories
//! for the per-screen view-models.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{ApiError, SharedApi};
use crate::chat::{ConversationView, MessageComposer};
use crate::config::CoreConfig;
use crate::listings::ListingService;
use crate::models::{ConversationKey, NotificationCounts, Profile};
use crate::notifications::NotificationPoller;
use crate::session::{resolve_route, AuthError, AuthService, AuthState, RouteMatch, SessionStore};
use crate::wishlist::WishlistService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellMode {
    Online,
    /// Initial reachability check failed; every path shows the maintenance page
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellView {
    Maintenance,
    Route(RouteMatch),
}

pub struct NavigationShell {
    config: CoreConfig,
    api: SharedApi,
    session: Arc<SessionStore>,
    mode: ShellMode,
    /// Absent in maintenance mode: nothing talks to the backend
    notifications: Option<NotificationPoller>,
}

impl NavigationShell {
    /// Check reachability, validate a stored token, start the badge poller.
    pub async fn boot(config: CoreConfig, api: SharedApi, session: Arc<SessionStore>) -> Self {
        let mode = match api.check_status().await {
            Ok(true) => ShellMode::Online,
            Ok(false) => {
                warn!("Backend reports it is not online, entering maintenance mode");
                ShellMode::Maintenance
            }
            Err(e) => {
                warn!("Backend unreachable, entering maintenance mode: {}", e);
                ShellMode::Maintenance
            }
        };

        let notifications = if mode == ShellMode::Online {
            Self::verify_session(&api, &session).await;
            Some(NotificationPoller::spawn(
                api.clone(),
                session.clone(),
                config.unread_poll_interval,
            ))
        } else {
            None
        };

        info!(?mode, auth = ?session.auth_state(), "shell ready");
        Self {
            config,
            api,
            session,
            mode,
            notifications,
        }
    }

    /// A rejected token is treated like a 401; a transport failure keeps the
    /// token-derived state until a guarded call says otherwise.
    async fn verify_session(api: &SharedApi, session: &Arc<SessionStore>) {
        let Some(token) = session.token() else {
            return;
        };
        match api.verify_token(&token).await {
            Ok(true) => {}
            Ok(false) | Err(ApiError::Unauthorized) => session.invalidate(),
            Err(e) => warn!("Could not verify stored session: {}", e),
        }
    }

    pub fn mode(&self) -> ShellMode {
        self.mode
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn session(&self) -> Arc<SessionStore> {
        self.session.clone()
    }

    pub fn api(&self) -> SharedApi {
        self.api.clone()
    }

    pub fn auth_state(&self) -> AuthState {
        self.session.auth_state()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.session.profile()
    }

    pub fn counts(&self) -> NotificationCounts {
        self.notifications
            .as_ref()
            .map(NotificationPoller::counts)
            .unwrap_or_default()
    }

    /// In maintenance mode the receiver holds the default counts and never changes
    pub fn subscribe_counts(&self) -> watch::Receiver<NotificationCounts> {
        match &self.notifications {
            Some(poller) => poller.subscribe(),
            None => watch::channel(NotificationCounts::default()).1,
        }
    }

    pub fn resolve(&self, path: &str) -> ShellView {
        match self.mode {
            ShellMode::Maintenance => ShellView::Maintenance,
            ShellMode::Online => ShellView::Route(resolve_route(path, self.session.auth_state())),
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.api.clone(), self.session.clone())
    }

    pub fn wishlist(&self) -> WishlistService {
        WishlistService::new(self.api.clone(), self.session.clone())
    }

    pub fn listings(&self) -> ListingService {
        ListingService::new(self.api.clone(), self.session.clone())
    }

    pub fn conversation_view(&self) -> ConversationView {
        ConversationView::new(
            self.api.clone(),
            self.session.clone(),
            self.config.chat_poll_interval,
        )
    }

    pub fn composer(&self, key: ConversationKey) -> MessageComposer {
        MessageComposer::new(self.api.clone(), self.session.clone(), key)
    }

    /// Clear the session and reload the chrome from scratch: a fresh badge
    /// poller, landing on the home view.
    pub fn logout(&mut self) -> Result<ShellView, AuthError> {
        self.auth().logout()?;
        if self.mode == ShellMode::Online {
            self.notifications = Some(NotificationPoller::spawn(
                self.api.clone(),
                self.session.clone(),
                self.config.unread_poll_interval,
            ));
        }
        Ok(self.resolve("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::keys;
    use crate::session::Route;
    use crate::testing::{sample_session, step_secs, FakeApi};

    fn config() -> CoreConfig {
        CoreConfig::new("/tmp/retrend-test")
    }

    fn logged_in() -> Arc<SessionStore> {
        let session = SessionStore::in_memory().shared();
        session.set_session(&sample_session()).unwrap();
        session
    }

    #[tokio::test]
    async fn test_unreachable_backend_enters_maintenance() {
        let api = Arc::new(FakeApi::new());
        api.set_online(Err(ApiError::transport("/api/check-status", "dns failure")));
        let shell = NavigationShell::boot(config(), api, logged_in()).await;

        assert_eq!(shell.mode(), ShellMode::Maintenance);
        assert_eq!(shell.resolve("/"), ShellView::Maintenance);
        assert_eq!(shell.resolve("/profile"), ShellView::Maintenance);
    }

    #[tokio::test(start_paused = true)]
    async fn test_maintenance_mode_does_not_poll_badges() {
        let api = Arc::new(FakeApi::new());
        api.set_online(Err(ApiError::transport("/api/check-status", "dns failure")));
        api.set_unread(Ok(4));
        let shell = NavigationShell::boot(config(), api.clone(), logged_in()).await;

        step_secs(61).await;

        let calls = api.calls();
        assert_eq!(calls.unread, 0);
        assert_eq!(calls.wishlist_fetch, 0);
        assert_eq!(calls.verify, 0);
        assert_eq!(shell.counts(), NotificationCounts::default());
    }

    #[tokio::test]
    async fn test_offline_status_enters_maintenance() {
        let api = Arc::new(FakeApi::new());
        api.set_online(Ok(false));
        let shell = NavigationShell::boot(config(), api, SessionStore::in_memory().shared()).await;
        assert_eq!(shell.mode(), ShellMode::Maintenance);
    }

    #[tokio::test]
    async fn test_valid_session_mounts_guarded_routes() {
        let api = Arc::new(FakeApi::new());
        let shell = NavigationShell::boot(config(), api.clone(), logged_in()).await;

        assert_eq!(shell.mode(), ShellMode::Online);
        assert_eq!(api.calls().verify, 1);
        assert_eq!(shell.resolve("/profile"), ShellView::Route(RouteMatch::View(Route::Profile)));
    }

    #[tokio::test]
    async fn test_rejected_token_clears_session_at_boot() {
        let api = Arc::new(FakeApi::new());
        api.set_token_valid(Ok(false));
        let session = logged_in();
        let shell = NavigationShell::boot(config(), api, session.clone()).await;

        assert_eq!(shell.auth_state(), AuthState::Anonymous);
        assert!(session.token().is_none());
        assert_eq!(shell.resolve("/profile"), ShellView::Route(RouteMatch::NotFound));
    }

    #[tokio::test]
    async fn test_unverifiable_token_keeps_authenticated() {
        let api = Arc::new(FakeApi::new());
        api.set_token_valid(Err(ApiError::transport("/auth-endpoint", "timeout")));
        let shell = NavigationShell::boot(config(), api, logged_in()).await;

        assert_eq!(shell.auth_state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_logout_clears_identity_and_unmounts_guarded_routes() {
        let api = Arc::new(FakeApi::new());
        let session = logged_in();
        let mut shell = NavigationShell::boot(config(), api, session.clone()).await;

        let landing = shell.logout().unwrap();

        assert_eq!(landing, ShellView::Route(RouteMatch::View(Route::Home)));
        for key in keys::IDENTITY {
            assert!(session.raw(key).is_none(), "{} survived logout", key);
        }
        assert_eq!(shell.resolve("/profile"), ShellView::Route(RouteMatch::NotFound));
        assert_eq!(
            shell.resolve("/wishlist"),
            ShellView::Route(RouteMatch::LoginPrompt(Route::Wishlist))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_badges_follow_session() {
        let api = Arc::new(FakeApi::new());
        api.set_unread(Ok(2));
        api.set_wishlist(&["p1", "p2", "p3"]);
        let mut shell = NavigationShell::boot(config(), api, logged_in()).await;
        step_secs(1).await;

        assert_eq!(
            shell.counts(),
            NotificationCounts {
                unread_messages: 2,
                wishlist: 3
            }
        );

        shell.logout().unwrap();
        step_secs(1).await;
        assert_eq!(shell.counts(), NotificationCounts::default());
    }
}
