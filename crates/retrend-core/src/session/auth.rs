use std::sync::Arc;

use tracing::info;

use super::{SessionStore, SessionStoreError};
use crate::api::{ApiError, SharedApi};
use crate::models::{Credentials, Registration, Session};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] SessionStoreError),

    #[error("{0}")]
    Validation(String),
}

/// Credential exchanges and logout. The only writer of identity keys.
pub struct AuthService {
    api: SharedApi,
    session: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(api: SharedApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.authenticate(Credentials::Password {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn google_auth(&self, id_token: &str) -> Result<Session, AuthError> {
        self.authenticate(Credentials::Google {
            id_token: id_token.to_string(),
        })
        .await
    }

    pub async fn phone_auth(&self, id_token: &str, phone_number: &str) -> Result<Session, AuthError> {
        self.authenticate(Credentials::Phone {
            id_token: id_token.to_string(),
            phone_number: phone_number.trim().to_string(),
        })
        .await
    }

    /// Exchange credentials and persist the resulting session (Anonymous -> Authenticated)
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Session, AuthError> {
        let response = self.api.authenticate(&credentials).await?;
        let mut session = Session::from_auth(response);

        // Phone sign-in: the verified number is authoritative and doubles as a display name
        if let Credentials::Phone { phone_number, .. } = &credentials {
            session.profile.phone = phone_number.clone();
            if session.profile.name.is_empty() {
                session.profile.name = phone_number.clone();
            }
        }

        self.session.set_session(&session)?;
        Ok(session)
    }

    /// Create an account. Does not sign in; the caller logs in afterwards.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if password != confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }
        let registration = Registration {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.api.register(&registration).await?;
        info!(email = %registration.email, "account created");
        Ok(())
    }

    /// Clear every identity key. The navigation chrome must reload afterwards.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.clear_session()?;
        info!("logged out");
        Ok(())
    }
}
