//! Poll-based conversation sync and the outbound message composer.

mod composer;
mod feed;

pub use composer::{MessageComposer, SubmitOutcome};
pub use feed::{unread_message_ids, ConversationFeed, ConversationView, FeedSnapshot, TickOutcome};
