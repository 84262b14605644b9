//! Listing feed filtered by the saved location preference.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ApiResult, SharedApi};
use crate::models::{LocationPreference, Product};
use crate::session::{SessionStore, SessionStoreError};

pub struct ListingService {
    api: SharedApi,
    session: Arc<SessionStore>,
}

impl ListingService {
    pub fn new(api: SharedApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub fn location(&self) -> LocationPreference {
        self.session.location()
    }

    pub fn set_location(&self, location: &LocationPreference) -> Result<(), SessionStoreError> {
        debug!(location = %location.name, "location preference changed");
        self.session.set_location(location)
    }

    /// Products near the saved location (default: India)
    pub async fn feed(&self) -> ApiResult<Vec<Product>> {
        let location = self.session.location();
        self.api.fetch_products(&location.name).await.map_err(|e| {
            warn!(location = %location.name, "Failed to fetch products: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_LOCATION;
    use crate::testing::{product, FakeApi};

    #[tokio::test]
    async fn test_feed_uses_default_location() {
        let api = Arc::new(FakeApi::new());
        api.set_products(Ok(vec![product("p1")]));
        let listings = ListingService::new(api.clone(), SessionStore::in_memory().shared());

        let products = listings.feed().await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(api.calls().products, vec![DEFAULT_LOCATION.to_string()]);
    }

    #[tokio::test]
    async fn test_feed_follows_saved_location() {
        let api = Arc::new(FakeApi::new());
        let listings = ListingService::new(api.clone(), SessionStore::in_memory().shared());

        listings.set_location(&LocationPreference::named("Pune, Maharashtra")).unwrap();
        listings.feed().await.unwrap();

        assert_eq!(api.calls().products, vec!["Pune, Maharashtra".to_string()]);
        assert_eq!(listings.location().name, "Pune, Maharashtra");
    }
}
