//! Data models for accounts and API responses.

pub mod account;
pub mod response;

pub use account::*;
pub use response::*;
