use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, ApiResult, MarketplaceApi, SendStatus};
use crate::config::CoreConfig;
use crate::constants::endpoints;
use crate::models::{
    AuthResponse, ConversationKey, Credentials, Message, Product, Registration, UnreadCount,
    WishlistEntry,
};

#[derive(Debug, Deserialize)]
struct ServiceStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenCheck {
    #[serde(default)]
    is_authenticated: bool,
}

/// reqwest-backed implementation of [`MarketplaceApi`]
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(config: &CoreConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::transport("client", e))?;
        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Send and map transport failures and 401.
    async fn send(endpoint: &str, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::transport(endpoint, "request timed out")
            } else {
                ApiError::transport(endpoint, e)
            }
        })?;
        debug!(endpoint, status = response.status().as_u16(), "backend response");
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        Ok(response)
    }

    fn ensure_success(endpoint: &str, response: &Response) -> ApiResult<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            })
        }
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> ApiResult<T> {
        Self::ensure_success(endpoint, &response)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(endpoint, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::decode(endpoint, e))
    }

    /// Map the login endpoint's business-rule statuses
    fn login_rejection(status: StatusCode) -> Option<ApiError> {
        match status {
            StatusCode::NOT_FOUND => Some(ApiError::rejected(404, "No account found with this email")),
            StatusCode::BAD_REQUEST => Some(ApiError::rejected(400, "Incorrect password")),
            _ => None,
        }
    }
}

#[async_trait]
impl MarketplaceApi for HttpApi {
    async fn fetch_conversation(&self, token: &str, key: &ConversationKey) -> ApiResult<Vec<Message>> {
        let endpoint = endpoints::CONVERSATION;
        let request = self
            .client
            .get(self.url(endpoint))
            .query(&[("id", key.id.as_str()), ("to", key.peer.as_str())]);
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        Self::decode(endpoint, response).await
    }

    async fn mark_messages_read(&self, token: &str, message_ids: &[String]) -> ApiResult<()> {
        let endpoint = endpoints::MARK_READ;
        let request = self
            .client
            .post(self.url(endpoint))
            .json(&serde_json::json!({ "messageIds": message_ids }));
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        Self::ensure_success(endpoint, &response)
    }

    async fn send_message(&self, token: &str, key: &ConversationKey, body: &str) -> ApiResult<SendStatus> {
        let endpoint = endpoints::SEND_MESSAGE;
        let request = self.client.post(self.url(endpoint)).json(&serde_json::json!({
            "message": body,
            "id": key.id,
            "to": key.peer,
        }));
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        match response.status() {
            StatusCode::OK => Ok(SendStatus::Accepted),
            StatusCode::CREATED => Ok(SendStatus::Rejected),
            status => Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn fetch_wishlist(&self, token: &str) -> ApiResult<Vec<WishlistEntry>> {
        let endpoint = endpoints::WISHLIST;
        let request = self.client.get(self.url(endpoint));
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        // The backend answers an empty wishlist with `null` on some deployments
        let entries: Option<Vec<WishlistEntry>> = Self::decode(endpoint, response).await?;
        Ok(entries.unwrap_or_default())
    }

    async fn add_to_wishlist(&self, token: &str, product_id: &str) -> ApiResult<()> {
        let endpoint = endpoints::WISHLIST_ADD;
        let request = self
            .client
            .post(self.url(endpoint))
            .json(&serde_json::json!({ "productId": product_id }));
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        Self::ensure_success(endpoint, &response)
    }

    async fn remove_from_wishlist(&self, token: &str, product_id: &str) -> ApiResult<()> {
        let endpoint = endpoints::WISHLIST_REMOVE;
        let url = format!("{}/{}", self.url(endpoint), product_id);
        let request = self.client.delete(url);
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        Self::ensure_success(endpoint, &response)
    }

    async fn unread_count(&self, token: &str) -> ApiResult<u64> {
        let endpoint = endpoints::UNREAD_MESSAGES;
        let request = self.client.get(self.url(endpoint));
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        let unread: UnreadCount = Self::decode(endpoint, response).await?;
        Ok(unread.value())
    }

    async fn authenticate(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let (endpoint, body) = match credentials {
            Credentials::Password { email, password } => (
                endpoints::LOGIN,
                serde_json::json!({ "email": email, "password": password }),
            ),
            Credentials::Google { id_token } => (
                endpoints::GOOGLE_AUTH,
                serde_json::json!({ "credential": id_token }),
            ),
            Credentials::Phone {
                id_token,
                phone_number,
            } => (
                endpoints::PHONE_AUTH,
                serde_json::json!({ "credential": id_token, "phoneNumber": phone_number }),
            ),
        };
        let response = Self::send(endpoint, self.client.post(self.url(endpoint)).json(&body)).await?;
        if endpoint == endpoints::LOGIN {
            if let Some(rejection) = Self::login_rejection(response.status()) {
                return Err(rejection);
            }
        }
        Self::decode(endpoint, response).await
    }

    async fn register(&self, registration: &Registration) -> ApiResult<()> {
        let endpoint = endpoints::REGISTER;
        let request = self.client.post(self.url(endpoint)).json(registration);
        let response = Self::send(endpoint, request).await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(ApiError::rejected(409, "An account with this email already exists"));
        }
        Self::ensure_success(endpoint, &response)
    }

    async fn fetch_products(&self, location: &str) -> ApiResult<Vec<Product>> {
        let endpoint = endpoints::PRODUCTS;
        let request = self
            .client
            .get(self.url(endpoint))
            .query(&[("location", location)]);
        let response = Self::send(endpoint, request).await?;
        Self::decode(endpoint, response).await
    }

    async fn check_status(&self) -> ApiResult<bool> {
        let endpoint = endpoints::CHECK_STATUS;
        let response = Self::send(endpoint, self.client.get(self.url(endpoint))).await?;
        let status: ServiceStatus = Self::decode(endpoint, response).await?;
        Ok(status.status == "online")
    }

    async fn verify_token(&self, token: &str) -> ApiResult<bool> {
        let endpoint = endpoints::VERIFY_TOKEN;
        let request = self.client.get(self.url(endpoint));
        let response = Self::send(endpoint, Self::authorized(request, token)).await?;
        let check: TokenCheck = Self::decode(endpoint, response).await?;
        Ok(check.is_authenticated)
    }
}
