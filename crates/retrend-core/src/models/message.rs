use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as returned by `/api/new-messages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "message")]
    pub body: String,
    /// Missing on some legacy rows
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_read: bool,
}

impl Message {
    /// Addressed to `self_email` and not yet read
    pub fn is_unread_for(&self, self_email: &str) -> bool {
        self.to == self_email && !self.is_read
    }

    pub fn is_from(&self, self_email: &str) -> bool {
        self.from == self_email
    }
}

/// Identifies one conversation on the backend.
///
/// `id` is the anchor the backend expects in the `id` field (the `:id` segment
/// of a chat route); `peer` is the other participant's email.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub id: String,
    pub peer: String,
}

impl ConversationKey {
    pub fn new(id: impl Into<String>, peer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            peer: peer.into(),
        }
    }
}
