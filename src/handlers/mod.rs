//! HTTP handlers: shared state, health, user management.

pub mod http;
pub mod users;

pub use http::{health, AppState};
