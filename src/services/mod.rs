//! Business logic: account management and startup seeding.

pub mod accounts;

pub use accounts::{AccountService, AccountUpdate, NewAccount};
