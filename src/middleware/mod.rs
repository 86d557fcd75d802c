//! Request guards: bearer-token authentication and role checks.

pub mod auth;

pub use auth::AuthUser;
