//! Persistent identity, the Anonymous/Authenticated state machine and route gating.

mod auth;
mod routes;
mod storage;
mod store;

pub use auth::{AuthError, AuthService};
pub use routes::{resolve_route, Route, RouteMatch};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use store::{AuthState, SessionStore, SessionStoreError};
