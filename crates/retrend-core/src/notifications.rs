//! Badge counters for the navigation shell.
//!
//! The unread-message count is polled on a timer while authenticated. The
//! wishlist count is fetched once per Anonymous -> Authenticated flip and is
//! not re-polled, so it can lag behind wishlist edits until the next flip.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::SharedApi;
use crate::models::NotificationCounts;
use crate::schedule::{spawn_periodic, FirstTick, PollHandle};
use crate::session::{AuthState, SessionStore};

pub struct NotificationPoller {
    counts_rx: watch::Receiver<NotificationCounts>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl NotificationPoller {
    /// Start following the session's auth state
    pub fn spawn(api: SharedApi, session: Arc<SessionStore>, unread_interval: Duration) -> Self {
        let (counts_tx, counts_rx) = watch::channel(NotificationCounts::default());
        let counts_tx = Arc::new(counts_tx);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut auth_rx = session.subscribe();
            let mut current: Option<AuthState> = None;
            let mut unread_poll: Option<PollHandle> = None;
            let mut epoch = token.child_token();

            loop {
                let state = *auth_rx.borrow_and_update();
                if current != Some(state) {
                    current = Some(state);
                    // End everything tied to the previous state
                    epoch.cancel();
                    unread_poll = None;
                    epoch = token.child_token();

                    match state {
                        AuthState::Authenticated => {
                            debug!("session authenticated, starting notification polling");
                            spawn_wishlist_fetch(&api, &session, &counts_tx, epoch.clone());
                            unread_poll = Some(spawn_unread_poll(
                                &api,
                                &session,
                                &counts_tx,
                                unread_interval,
                            ));
                        }
                        AuthState::Anonymous => {
                            debug!("session anonymous, notification polling stopped");
                            counts_tx.send_replace(NotificationCounts::default());
                        }
                    }
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = auth_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            epoch.cancel();
            drop(unread_poll);
        });

        Self {
            counts_rx,
            cancel,
            task,
        }
    }

    pub fn counts(&self) -> NotificationCounts {
        *self.counts_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationCounts> {
        self.counts_rx.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_wishlist_fetch(
    api: &SharedApi,
    session: &Arc<SessionStore>,
    counts_tx: &Arc<watch::Sender<NotificationCounts>>,
    epoch: CancellationToken,
) {
    let Some(token) = session.token() else {
        return;
    };
    let api = api.clone();
    let session = session.clone();
    let counts_tx = counts_tx.clone();
    tokio::spawn(async move {
        match api.fetch_wishlist(&token).await {
            Ok(entries) if !epoch.is_cancelled() => {
                let count = entries.len() as u64;
                counts_tx.send_modify(|c| c.wishlist = count);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Error fetching wishlist: {}", e);
                if e.is_unauthorized() {
                    session.invalidate();
                }
            }
        }
    });
}

fn spawn_unread_poll(
    api: &SharedApi,
    session: &Arc<SessionStore>,
    counts_tx: &Arc<watch::Sender<NotificationCounts>>,
    interval: Duration,
) -> PollHandle {
    let api = api.clone();
    let session = session.clone();
    let counts_tx = counts_tx.clone();
    spawn_periodic(interval, FirstTick::Immediate, move |cancel| {
        let api = api.clone();
        let session = session.clone();
        let counts_tx = counts_tx.clone();
        async move {
            let Some(token) = session.token() else {
                return;
            };
            match api.unread_count(&token).await {
                Ok(_) if cancel.is_cancelled() => {}
                Ok(count) => counts_tx.send_modify(|c| c.unread_messages = count),
                Err(e) => {
                    warn!("Error fetching unread messages: {}", e);
                    if e.is_unauthorized() {
                        session.invalidate();
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::testing::{sample_session, settle, step_secs, FakeApi};

    fn setup(authenticated: bool) -> (Arc<FakeApi>, Arc<SessionStore>) {
        let api = Arc::new(FakeApi::new());
        let session = SessionStore::in_memory().shared();
        if authenticated {
            session.set_session(&sample_session()).unwrap();
        }
        (api, session)
    }

    fn poller(api: &Arc<FakeApi>, session: &Arc<SessionStore>) -> NotificationPoller {
        NotificationPoller::spawn(api.clone(), session.clone(), Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn test_anonymous_session_never_polls() {
        let (api, session) = setup(false);
        let poller = poller(&api, &session);

        step_secs(90).await;

        assert_eq!(api.calls().unread, 0);
        assert_eq!(api.calls().wishlist_fetch, 0);
        assert_eq!(poller.counts(), NotificationCounts::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_polled_every_thirty_seconds() {
        let (api, session) = setup(true);
        api.set_unread(Ok(4));
        let poller = poller(&api, &session);

        settle().await;
        assert_eq!(api.calls().unread, 1);
        assert_eq!(poller.counts().unread_messages, 4);

        step_secs(29).await;
        assert_eq!(api.calls().unread, 1);

        api.set_unread(Ok(6));
        step_secs(1).await;
        assert_eq!(api.calls().unread, 2);
        assert_eq!(poller.counts().unread_messages, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wishlist_count_is_not_repolled() {
        let (api, session) = setup(true);
        api.set_wishlist(&["p1", "p2"]);
        let poller = poller(&api, &session);

        settle().await;
        assert_eq!(poller.counts().wishlist, 2);

        // Known staleness window: a wishlist change is not picked up by polling
        api.set_wishlist(&["p1", "p2", "p3"]);
        step_secs(90).await;
        assert_eq!(api.calls().wishlist_fetch, 1);
        assert_eq!(poller.counts().wishlist, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_stops_polling_and_login_restarts_it() {
        let (api, session) = setup(true);
        let poller = poller(&api, &session);
        settle().await;
        assert_eq!(api.calls().unread, 1);

        session.clear_session().unwrap();
        settle().await;
        step_secs(90).await;
        assert_eq!(api.calls().unread, 1);
        assert_eq!(poller.counts(), NotificationCounts::default());

        api.set_wishlist(&["p1"]);
        session.set_session(&sample_session()).unwrap();
        settle().await;
        assert_eq!(api.calls().unread, 2);
        assert_eq!(api.calls().wishlist_fetch, 2);
        assert_eq!(poller.counts().wishlist, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_keeps_last_count_and_polling_continues() {
        let (api, session) = setup(true);
        api.set_unread(Ok(3));
        let poller = poller(&api, &session);
        settle().await;

        api.set_unread(Err(ApiError::transport("/unreadMessages", "timeout")));
        step_secs(30).await;
        assert_eq!(poller.counts().unread_messages, 3);

        api.set_unread(Ok(1));
        step_secs(30).await;
        assert_eq!(api.calls().unread, 3);
        assert_eq!(poller.counts().unread_messages, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_unread_logs_out() {
        let (api, session) = setup(true);
        api.set_unread(Err(ApiError::Unauthorized));
        let _poller = poller(&api, &session);
        settle().await;

        assert_eq!(session.auth_state(), AuthState::Anonymous);
        step_secs(60).await;
        assert_eq!(api.calls().unread, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_supervisor() {
        let (api, session) = setup(true);
        let poller = poller(&api, &session);
        settle().await;

        poller.stop();
        settle().await;
        step_secs(60).await;

        assert!(poller.is_finished());
        assert_eq!(api.calls().unread, 1);
    }
}
