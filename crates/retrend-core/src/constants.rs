//! Application-wide constants
//!
//! Endpoint paths, polling cadences and persisted key names shared by the
//! client modules.

use std::time::Duration;

/// Default backend base URL
pub const API_BASE_URL: &str = "https://retrend-final.onrender.com";

/// Avatar used when the identity provider returns no picture
pub const DEFAULT_AVATAR_URL: &str = "https://cdn-icons-png.flaticon.com/512/3135/3135715.png";

/// Listing feed location used when no preference has been saved
pub const DEFAULT_LOCATION: &str = "India";

/// Conversation refresh cadence
pub const CHAT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Unread-message badge refresh cadence
pub const UNREAD_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shown in the composer when the backend refuses a message (HTTP 201)
pub const MESSAGE_REJECTED_NOTICE: &str = "You cannot send Message";

// Backend endpoints
pub mod endpoints {
    pub const CONVERSATION: &str = "/api/new-messages";
    pub const MARK_READ: &str = "/mark-messages-read";
    pub const SEND_MESSAGE: &str = "/sendMessage";
    pub const WISHLIST: &str = "/wishlist";
    pub const WISHLIST_ADD: &str = "/wishlist/add";
    pub const WISHLIST_REMOVE: &str = "/wishlist/remove";
    pub const UNREAD_MESSAGES: &str = "/unreadMessages";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const GOOGLE_AUTH: &str = "/google-auth";
    pub const PHONE_AUTH: &str = "/phone-auth";
    pub const PRODUCTS: &str = "/getProducts";
    pub const CHECK_STATUS: &str = "/api/check-status";
    pub const VERIFY_TOKEN: &str = "/auth-endpoint";
}

// Persisted client state keys
pub mod keys {
    pub const AUTH_TOKEN: &str = "authToken";
    pub const AUTH_EMAIL: &str = "authemail";
    pub const AUTH_NAME: &str = "authname";
    pub const AUTH_PHONE: &str = "authphone";
    pub const AUTH_PICTURE: &str = "authpicture";
    pub const USER_LOCATION: &str = "userLocation";

    /// The five identity keys cleared together on logout
    pub const IDENTITY: [&str; 5] = [AUTH_TOKEN, AUTH_EMAIL, AUTH_NAME, AUTH_PHONE, AUTH_PICTURE];
}
