use serde::{Deserialize, Serialize};

/// Badge counts shown by the navigation shell. Overwritten on each poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationCounts {
    pub unread_messages: u64,
    pub wishlist: u64,
}

/// Body of `GET /unreadMessages`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UnreadCount {
    #[serde(default)]
    pub count: Option<u64>,
}

impl UnreadCount {
    pub fn value(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}
