use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiError, SendStatus, SharedApi};
use crate::constants::MESSAGE_REJECTED_NOTICE;
use crate::models::ConversationKey;
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input; nothing was sent
    Skipped,
    /// Accepted by the backend; input cleared
    Sent,
    /// Refused by a business rule; the input now holds `notice`
    Rejected { notice: String },
    /// Transport/auth/other failure; input left untouched for a manual retry
    Failed(ApiError),
}

/// Single-line message input bound to one conversation
pub struct MessageComposer {
    api: SharedApi,
    session: Arc<SessionStore>,
    key: ConversationKey,
    input: String,
}

impl MessageComposer {
    pub fn new(api: SharedApi, session: Arc<SessionStore>, key: ConversationKey) -> Self {
        Self {
            api,
            session,
            key,
            input: String::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the send control should be shown
    pub fn can_submit(&self) -> bool {
        !self.input.is_empty()
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.can_submit() {
            return SubmitOutcome::Skipped;
        }
        let Some(token) = self.session.token() else {
            return SubmitOutcome::Failed(ApiError::NotAuthenticated(
                "Please login to send messages".to_string(),
            ));
        };

        match self.api.send_message(&token, &self.key, &self.input).await {
            Ok(SendStatus::Accepted) => {
                info!(peer = %self.key.peer, "message sent");
                self.input.clear();
                SubmitOutcome::Sent
            }
            Ok(SendStatus::Rejected) => {
                warn!(peer = %self.key.peer, "message rejected by backend");
                self.input = MESSAGE_REJECTED_NOTICE.to_string();
                SubmitOutcome::Rejected {
                    notice: MESSAGE_REJECTED_NOTICE.to_string(),
                }
            }
            Err(e) => {
                warn!(peer = %self.key.peer, "Failed to send message: {}", e);
                if e.is_unauthorized() {
                    self.session.invalidate();
                }
                SubmitOutcome::Failed(e)
            }
        }
    }
}
