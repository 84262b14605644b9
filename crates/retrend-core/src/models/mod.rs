pub mod location;
pub mod message;
pub mod notifications;
pub mod product;
pub mod session;
pub mod wishlist;

pub use location::{Coordinates, LocationAddress, LocationPreference};
pub use message::{ConversationKey, Message};
pub use notifications::{NotificationCounts, UnreadCount};
pub use product::Product;
pub use session::{AuthResponse, Credentials, Profile, Registration, Session};
pub use wishlist::WishlistEntry;
