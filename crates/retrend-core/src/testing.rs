//! Test doubles shared by the unit tests.

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use crate::api::{ApiError, ApiResult, MarketplaceApi, SendStatus};
use crate::models::{
    AuthResponse, ConversationKey, Credentials, Message, Product, Profile, Registration, Session,
    WishlistEntry,
};

/// Let spawned tasks and the timer driver catch up
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Advance paused time one second at a time so every tick is observed
pub async fn step_secs(secs: u64) {
    for _ in 0..secs {
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
    }
}

pub const SELF_EMAIL: &str = "me@example.com";
pub const PEER_EMAIL: &str = "seller@example.com";

pub fn sample_session() -> Session {
    Session {
        token: "test-token".to_string(),
        profile: Profile {
            email: SELF_EMAIL.to_string(),
            name: "Me".to_string(),
            phone: "+910000000000".to_string(),
            picture: "https://img.example.com/me.png".to_string(),
        },
    }
}

pub fn message(id: &str, from: &str, to: &str, is_read: bool) -> Message {
    Message {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        body: format!("body of {}", id),
        created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
        is_read,
    }
}

/// `n` messages alternating direction, all read
pub fn conversation(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| {
            let (from, to) = if i % 2 == 0 {
                (SELF_EMAIL, PEER_EMAIL)
            } else {
                (PEER_EMAIL, SELF_EMAIL)
            };
            message(&format!("m{}", i), from, to, true)
        })
        .collect()
}

pub fn product(id: &str) -> Product {
    serde_json::from_value(serde_json::json!({ "_id": id, "title": format!("Listing {}", id) }))
        .unwrap()
}

#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub conversation: usize,
    pub mark_read: Vec<Vec<String>>,
    pub sent: Vec<(ConversationKey, String)>,
    pub wishlist_fetch: usize,
    pub wishlist_add: Vec<String>,
    pub wishlist_remove: Vec<String>,
    pub unread: usize,
    pub register: usize,
    pub products: Vec<String>,
    pub verify: usize,
}

struct State {
    calls: Calls,
    conversation: VecDeque<ApiResult<Vec<Message>>>,
    last_conversation: Vec<Message>,
    conversation_delay: Option<Duration>,
    send_response: ApiResult<SendStatus>,
    wishlist: BTreeSet<String>,
    wishlist_error: Option<ApiError>,
    unread: ApiResult<u64>,
    auth_response: ApiResult<AuthResponse>,
    products: ApiResult<Vec<Product>>,
    online: ApiResult<bool>,
    token_valid: ApiResult<bool>,
}

/// In-memory [`MarketplaceApi`] that records every call
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                calls: Calls::default(),
                conversation: VecDeque::new(),
                last_conversation: Vec::new(),
                conversation_delay: None,
                send_response: Ok(SendStatus::Accepted),
                wishlist: BTreeSet::new(),
                wishlist_error: None,
                unread: Ok(0),
                auth_response: Ok(AuthResponse {
                    token: sample_session().token,
                    email: Some(SELF_EMAIL.to_string()),
                    name: Some("Me".to_string()),
                    phone: None,
                    picture: None,
                }),
                products: Ok(Vec::new()),
                online: Ok(true),
                token_valid: Ok(true),
            }),
        }
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().calls.clone()
    }

    /// Queue one poll result. Once the queue drains the last snapshot repeats.
    pub fn push_conversation(&self, result: ApiResult<Vec<Message>>) {
        self.state.lock().conversation.push_back(result);
    }

    pub fn set_conversation_delay(&self, delay: Duration) {
        self.state.lock().conversation_delay = Some(delay);
    }

    pub fn set_send_response(&self, response: ApiResult<SendStatus>) {
        self.state.lock().send_response = response;
    }

    pub fn set_wishlist(&self, product_ids: &[&str]) {
        self.state.lock().wishlist = product_ids.iter().map(|id| id.to_string()).collect();
    }

    pub fn set_wishlist_error(&self, error: Option<ApiError>) {
        self.state.lock().wishlist_error = error;
    }

    pub fn set_unread(&self, result: ApiResult<u64>) {
        self.state.lock().unread = result;
    }

    pub fn set_auth_response(&self, response: ApiResult<AuthResponse>) {
        self.state.lock().auth_response = response;
    }

    pub fn set_products(&self, result: ApiResult<Vec<Product>>) {
        self.state.lock().products = result;
    }

    pub fn set_online(&self, result: ApiResult<bool>) {
        self.state.lock().online = result;
    }

    pub fn set_token_valid(&self, result: ApiResult<bool>) {
        self.state.lock().token_valid = result;
    }
}

#[async_trait]
impl MarketplaceApi for FakeApi {
    async fn fetch_conversation(&self, _token: &str, _key: &ConversationKey) -> ApiResult<Vec<Message>> {
        let (result, delay) = {
            let mut state = self.state.lock();
            state.calls.conversation += 1;
            let result = match state.conversation.pop_front() {
                Some(result) => result,
                None => Ok(state.last_conversation.clone()),
            };
            if let Ok(messages) = &result {
                state.last_conversation = messages.clone();
            }
            (result, state.conversation_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn mark_messages_read(&self, _token: &str, message_ids: &[String]) -> ApiResult<()> {
        self.state.lock().calls.mark_read.push(message_ids.to_vec());
        Ok(())
    }

    async fn send_message(&self, _token: &str, key: &ConversationKey, body: &str) -> ApiResult<SendStatus> {
        let mut state = self.state.lock();
        state.calls.sent.push((key.clone(), body.to_string()));
        state.send_response.clone()
    }

    async fn fetch_wishlist(&self, _token: &str) -> ApiResult<Vec<WishlistEntry>> {
        let mut state = self.state.lock();
        state.calls.wishlist_fetch += 1;
        if let Some(err) = &state.wishlist_error {
            return Err(err.clone());
        }
        Ok(state
            .wishlist
            .iter()
            .enumerate()
            .map(|(i, id)| WishlistEntry {
                id: format!("w{}", i),
                product: Some(product(id)),
            })
            .collect())
    }

    async fn add_to_wishlist(&self, _token: &str, product_id: &str) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.calls.wishlist_add.push(product_id.to_string());
        if let Some(err) = &state.wishlist_error {
            return Err(err.clone());
        }
        state.wishlist.insert(product_id.to_string());
        Ok(())
    }

    async fn remove_from_wishlist(&self, _token: &str, product_id: &str) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.calls.wishlist_remove.push(product_id.to_string());
        if let Some(err) = &state.wishlist_error {
            return Err(err.clone());
        }
        state.wishlist.remove(product_id);
        Ok(())
    }

    async fn unread_count(&self, _token: &str) -> ApiResult<u64> {
        let mut state = self.state.lock();
        state.calls.unread += 1;
        state.unread.clone()
    }

    async fn authenticate(&self, _credentials: &Credentials) -> ApiResult<AuthResponse> {
        self.state.lock().auth_response.clone()
    }

    async fn register(&self, _registration: &Registration) -> ApiResult<()> {
        self.state.lock().calls.register += 1;
        Ok(())
    }

    async fn fetch_products(&self, location: &str) -> ApiResult<Vec<Product>> {
        let mut state = self.state.lock();
        state.calls.products.push(location.to_string());
        state.products.clone()
    }

    async fn check_status(&self) -> ApiResult<bool> {
        self.state.lock().online.clone()
    }

    async fn verify_token(&self, _token: &str) -> ApiResult<bool> {
        let mut state = self.state.lock();
        state.calls.verify += 1;
        state.token_valid.clone()
    }
}
