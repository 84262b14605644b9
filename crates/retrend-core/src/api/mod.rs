//! Backend contract and its HTTP implementation.

mod error;
mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    AuthResponse, ConversationKey, Credentials, Message, Product, Registration, WishlistEntry,
};

pub use error::ApiError;
pub use http::HttpApi;

pub type ApiResult<T> = Result<T, ApiError>;

/// Handle shared by every view-model that talks to the backend
pub type SharedApi = Arc<dyn MarketplaceApi>;

/// Outcome of `POST /sendMessage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// 200: stored and delivered on the peer's next poll
    Accepted,
    /// 201: refused by a business rule (e.g. the peer blocked messaging)
    Rejected,
}

/// Every call the client makes against the marketplace backend.
///
/// Guarded calls take the bearer token explicitly; callers read it from the
/// session store right before the call.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    async fn fetch_conversation(&self, token: &str, key: &ConversationKey) -> ApiResult<Vec<Message>>;

    async fn mark_messages_read(&self, token: &str, message_ids: &[String]) -> ApiResult<()>;

    async fn send_message(&self, token: &str, key: &ConversationKey, body: &str) -> ApiResult<SendStatus>;

    async fn fetch_wishlist(&self, token: &str) -> ApiResult<Vec<WishlistEntry>>;

    async fn add_to_wishlist(&self, token: &str, product_id: &str) -> ApiResult<()>;

    async fn remove_from_wishlist(&self, token: &str, product_id: &str) -> ApiResult<()>;

    async fn unread_count(&self, token: &str) -> ApiResult<u64>;

    async fn authenticate(&self, credentials: &Credentials) -> ApiResult<AuthResponse>;

    async fn register(&self, registration: &Registration) -> ApiResult<()>;

    async fn fetch_products(&self, location: &str) -> ApiResult<Vec<Product>>;

    /// Reachability probe; `true` when the backend reports "online"
    async fn check_status(&self) -> ApiResult<bool>;

    /// Server-side token validation
    async fn verify_token(&self, token: &str) -> ApiResult<bool>;
}
