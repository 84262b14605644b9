use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::{MemoryStorage, StorageBackend};
use crate::constants::keys;
use crate::models::{LocationPreference, Profile, Session};

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

impl AuthState {
    pub fn is_authenticated(self) -> bool {
        self == AuthState::Authenticated
    }
}

/// Typed client-side store for the identity fields and the location preference.
///
/// Only the login/logout transitions write identity keys. Every write goes
/// straight to the backend, and identity changes are broadcast as [`AuthState`].
pub struct SessionStore {
    backend: Box<dyn StorageBackend>,
    entries: RwLock<BTreeMap<String, String>>,
    state_tx: watch::Sender<AuthState>,
}

impl SessionStore {
    /// Load persisted entries. State at boot is inferred from token presence only.
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self, SessionStoreError> {
        let entries = backend.load()?;
        let state = Self::state_of(&entries);
        let (state_tx, _) = watch::channel(state);
        Ok(Self {
            backend,
            entries: RwLock::new(entries),
            state_tx,
        })
    }

    pub fn in_memory() -> Self {
        let (state_tx, _) = watch::channel(AuthState::Anonymous);
        Self {
            backend: Box::new(MemoryStorage::new()),
            entries: RwLock::new(BTreeMap::new()),
            state_tx,
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn state_of(entries: &BTreeMap<String, String>) -> AuthState {
        match entries.get(keys::AUTH_TOKEN) {
            Some(token) if !token.is_empty() => AuthState::Authenticated,
            _ => AuthState::Anonymous,
        }
    }

    // ===== Getters =====

    pub fn auth_state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    /// Change notification for login/logout transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.raw(keys::AUTH_TOKEN).filter(|t| !t.is_empty())
    }

    pub fn session(&self) -> Option<Session> {
        let entries = self.entries.read();
        let token = entries.get(keys::AUTH_TOKEN).filter(|t| !t.is_empty())?;
        let field = |key: &str| entries.get(key).cloned().unwrap_or_default();
        Some(Session {
            token: token.clone(),
            profile: Profile {
                email: field(keys::AUTH_EMAIL),
                name: field(keys::AUTH_NAME),
                phone: field(keys::AUTH_PHONE),
                picture: field(keys::AUTH_PICTURE),
            },
        })
    }

    pub fn profile(&self) -> Option<Profile> {
        self.session().map(|s| s.profile)
    }

    /// Saved listing location; default when absent or unreadable
    pub fn location(&self) -> LocationPreference {
        match self.raw(keys::USER_LOCATION) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable location preference: {}", e);
                LocationPreference::default()
            }),
            None => LocationPreference::default(),
        }
    }

    // ===== Mutations =====

    pub fn set_session(&self, session: &Session) -> Result<(), SessionStoreError> {
        {
            let mut entries = self.entries.write();
            entries.insert(keys::AUTH_TOKEN.to_string(), session.token.clone());
            entries.insert(keys::AUTH_EMAIL.to_string(), session.profile.email.clone());
            entries.insert(keys::AUTH_NAME.to_string(), session.profile.name.clone());
            entries.insert(keys::AUTH_PHONE.to_string(), session.profile.phone.clone());
            entries.insert(keys::AUTH_PICTURE.to_string(), session.profile.picture.clone());
            self.backend.save(&entries)?;
        }
        self.state_tx.send_replace(AuthState::Authenticated);
        info!(email = %session.profile.email, "session established");
        Ok(())
    }

    /// Remove all five identity keys. The location preference survives.
    pub fn clear_session(&self) -> Result<(), SessionStoreError> {
        {
            let mut entries = self.entries.write();
            for key in keys::IDENTITY {
                entries.remove(key);
            }
            self.backend.save(&entries)?;
        }
        self.state_tx.send_replace(AuthState::Anonymous);
        Ok(())
    }

    /// A guarded call came back 401: drop the session so the routes fall back
    /// to the anonymous set.
    pub fn invalidate(&self) {
        if self.auth_state() == AuthState::Anonymous {
            return;
        }
        warn!("Session rejected by backend, clearing stored credentials");
        if let Err(e) = self.clear_session() {
            error!("Failed to clear session: {}", e);
            // Still flip the in-memory state so pollers stop
            self.state_tx.send_replace(AuthState::Anonymous);
        }
    }

    pub fn set_location(&self, location: &LocationPreference) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string(location)?;
        let mut entries = self.entries.write();
        entries.insert(keys::USER_LOCATION.to_string(), raw);
        self.backend.save(&entries)
    }
}
