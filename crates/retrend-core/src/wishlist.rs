//! Wishlist membership, derived from the backend's full collection.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiError, ApiResult, SharedApi};
use crate::models::WishlistEntry;
use crate::session::SessionStore;

pub struct WishlistService {
    api: SharedApi,
    session: Arc<SessionStore>,
}

impl WishlistService {
    pub fn new(api: SharedApi, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    fn token(&self) -> ApiResult<String> {
        self.session.token().ok_or_else(|| {
            ApiError::NotAuthenticated("Please login to add items to your wishlist".to_string())
        })
    }

    /// Route 401s to the session before handing the error back
    fn observe<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.session.invalidate();
            } else {
                warn!("Wishlist operation failed: {}", e);
            }
        }
        result
    }

    /// Entries whose listing still exists
    pub async fn items(&self) -> ApiResult<Vec<WishlistEntry>> {
        let token = self.token()?;
        let entries = self.observe(self.api.fetch_wishlist(&token).await)?;
        Ok(entries.into_iter().filter(|e| e.product.is_some()).collect())
    }

    /// Membership check against the freshly fetched collection.
    /// Anonymous visitors have an empty wishlist.
    pub async fn contains(&self, product_id: &str) -> ApiResult<bool> {
        if self.session.token().is_none() {
            return Ok(false);
        }
        let items = self.items().await?;
        Ok(items.iter().any(|e| e.product_id() == Some(product_id)))
    }

    pub async fn add(&self, product_id: &str) -> ApiResult<()> {
        let token = self.token()?;
        self.observe(self.api.add_to_wishlist(&token, product_id).await)?;
        info!(product_id, "added to wishlist");
        Ok(())
    }

    pub async fn remove(&self, product_id: &str) -> ApiResult<()> {
        let token = self.token()?;
        self.observe(self.api.remove_from_wishlist(&token, product_id).await)?;
        info!(product_id, "removed from wishlist");
        Ok(())
    }

    /// Flip membership given what the card currently shows. Returns the new state;
    /// on failure the caller keeps showing `currently_member`.
    pub async fn toggle(&self, product_id: &str, currently_member: bool) -> ApiResult<bool> {
        if currently_member {
            self.remove(product_id).await?;
            Ok(false)
        } else {
            self.add(product_id).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AuthState;
    use crate::testing::{sample_session, FakeApi};

    fn service(api: &Arc<FakeApi>, authenticated: bool) -> (WishlistService, Arc<SessionStore>) {
        let session = SessionStore::in_memory().shared();
        if authenticated {
            session.set_session(&sample_session()).unwrap();
        }
        (WishlistService::new(api.clone(), session.clone()), session)
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_membership() {
        let api = Arc::new(FakeApi::new());
        let (wishlist, _) = service(&api, true);

        let before = wishlist.contains("p7").await.unwrap();
        let after_add = wishlist.toggle("p7", before).await.unwrap();
        assert!(after_add);
        assert!(wishlist.contains("p7").await.unwrap());

        let after_remove = wishlist.toggle("p7", after_add).await.unwrap();
        assert_eq!(after_remove, before);
        assert_eq!(wishlist.contains("p7").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_membership_of_existing_item() {
        let api = Arc::new(FakeApi::new());
        api.set_wishlist(&["p1", "p2"]);
        let (wishlist, _) = service(&api, true);

        assert!(wishlist.contains("p2").await.unwrap());
        assert!(!wishlist.contains("p3").await.unwrap());
        assert_eq!(wishlist.items().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_toggle_requires_login() {
        let api = Arc::new(FakeApi::new());
        let (wishlist, _) = service(&api, false);

        let err = wishlist.toggle("p1", false).await.unwrap_err();

        assert!(matches!(err, ApiError::NotAuthenticated(_)));
        assert!(api.calls().wishlist_add.is_empty());
        assert!(!wishlist.contains("p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let api = Arc::new(FakeApi::new());
        api.set_wishlist_error(Some(ApiError::Unauthorized));
        let (wishlist, session) = service(&api, true);

        assert!(wishlist.items().await.unwrap_err().is_unauthorized());
        assert_eq!(session.auth_state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_failed_toggle_reports_error() {
        let api = Arc::new(FakeApi::new());
        api.set_wishlist_error(Some(ApiError::transport("/wishlist/add", "offline")));
        let (wishlist, session) = service(&api, true);

        assert!(wishlist.toggle("p1", false).await.is_err());
        assert_eq!(session.auth_state(), AuthState::Authenticated);
    }
}
