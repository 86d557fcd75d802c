//! In-process account store backed by a `RwLock<HashMap>`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::AccountStore;
use crate::error::{AppError, AppResult};
use crate::models::{Account, Role};

/// Accounts keyed by id. Cloning shares the same map.
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(accounts: &HashMap<String, Account>, username: &str, except_id: &str) -> bool {
    accounts
        .values()
        .any(|a| a.username == username && a.id != except_id)
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.username == username).cloned())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn insert(&self, account: &Account) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) || username_taken(&accounts, &account.username, "") {
            return Err(AppError::username_taken(&account.username));
        }
        accounts.insert(account.id.clone(), account.clone());
        debug!(account_id = %account.id, "account inserted");
        Ok(())
    }

    async fn update(&self, account: &Account) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        if username_taken(&accounts, &account.username, &account.id) {
            return Err(AppError::username_taken(&account.username));
        }
        let stored = accounts
            .get_mut(&account.id)
            .ok_or_else(AppError::user_not_found)?;
        stored.username = account.username.clone();
        stored.first_name = account.first_name.clone();
        stored.last_name = account.last_name.clone();
        stored.password_hash = account.password_hash.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.accounts.write().await.remove(id).is_some())
    }

    async fn assign_role(&self, id: &str, role: Role) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get_mut(id)
            .ok_or_else(AppError::user_not_found)?;
        stored.roles.insert(role.as_str().to_string());
        Ok(())
    }
}
