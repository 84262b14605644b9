use serde::{Deserialize, Serialize};

use super::Product;

/// Row of `GET /wishlist`. `product` is null when the listing was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "productId", default)]
    pub product: Option<Product>,
}

impl WishlistEntry {
    pub fn product_id(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_product_has_no_id() {
        let entry: WishlistEntry = serde_json::from_str(r#"{"_id":"w1","productId":null}"#).unwrap();
        assert!(entry.product_id().is_none());
    }

    #[test]
    fn test_populated_product_id() {
        let entry: WishlistEntry =
            serde_json::from_str(r#"{"_id":"w1","productId":{"_id":"p9","title":"Phone"}}"#).unwrap();
        assert_eq!(entry.product_id(), Some("p9"));
    }
}
