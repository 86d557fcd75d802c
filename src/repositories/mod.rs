//! Account store boundary and its in-memory implementation.

mod memory;

pub use memory::MemoryAccountStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Account, Role};

/// Persistent account storage. Lookups are exact and case-sensitive; returned
/// accounts carry their current role set.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Account>>;

    async fn list(&self) -> AppResult<Vec<Account>>;

    /// Insert a new account together with its roles. Fails on a taken username.
    async fn insert(&self, account: &Account) -> AppResult<()>;

    /// Overwrite username, names and password hash. Roles are untouched.
    async fn update(&self, account: &Account) -> AppResult<()>;

    /// Returns `false` when no account had that id.
    async fn delete(&self, id: &str) -> AppResult<bool>;

    async fn assign_role(&self, id: &str, role: Role) -> AppResult<()>;
}
