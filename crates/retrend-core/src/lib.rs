pub mod api;
pub mod chat;
pub mod config;
pub mod constants;
pub mod listings;
pub mod models;
pub mod notifications;
pub mod schedule;
pub mod session;
pub mod shell;
pub mod tracing_setup;
pub mod wishlist;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, HttpApi, MarketplaceApi};
pub use config::CoreConfig;
pub use session::{AuthState, SessionStore};
pub use shell::NavigationShell;
