//! Account management: registration, profile updates, removal, admin seeding.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::hash_password_blocking;
use crate::config::SeedAdmin;
use crate::error::{AppError, AppResult};
use crate::models::{Account, Role};
use crate::repositories::AccountStore;

/// Profile fields supplied at registration.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Replacement profile for an existing account. A blank password leaves the hash alone.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Create an account with the default `Member` role.
    pub async fn register(&self, new: NewAccount, password: &str) -> AppResult<Account> {
        self.create(new, password, Role::Member).await
    }

    async fn create(&self, new: NewAccount, password: &str, role: Role) -> AppResult<Account> {
        if password.trim().is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        if new.username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if self.store.find_by_username(&new.username).await?.is_some() {
            return Err(AppError::username_taken(&new.username));
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: hash_password_blocking(password.to_string()).await?,
            roles: BTreeSet::from([role.as_str().to_string()]),
        };
        self.store.insert(&account).await?;
        info!(account_id = %account.id, username = %account.username, role = %role, "account created");
        Ok(account)
    }

    pub async fn list(&self) -> AppResult<Vec<Account>> {
        self.store.list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<Account>> {
        self.store.find_by_id(id).await
    }

    pub async fn update(&self, id: &str, update: AccountUpdate) -> AppResult<Account> {
        let mut account = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::user_not_found)?;

        if update.username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if update.username != account.username
            && self.store.find_by_username(&update.username).await?.is_some()
        {
            return Err(AppError::username_taken(&update.username));
        }

        account.username = update.username;
        account.first_name = update.first_name;
        account.last_name = update.last_name;
        if let Some(password) = update.password.filter(|p| !p.trim().is_empty()) {
            account.password_hash = hash_password_blocking(password).await?;
            debug!(account_id = %account.id, "password changed");
        }

        self.store.update(&account).await?;
        info!(account_id = %account.id, "account updated");
        Ok(account)
    }

    /// Remove an account. Unknown ids are ignored.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if self.store.delete(id).await? {
            info!(account_id = %id, "account deleted");
        }
        Ok(())
    }

    /// Create the configured administrator unless that username already exists.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, seed: &SeedAdmin) -> AppResult<bool> {
        if self.store.find_by_username(&seed.username).await?.is_some() {
            debug!(username = %seed.username, "seed admin already present");
            return Ok(false);
        }
        let new = NewAccount {
            username: seed.username.clone(),
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
        };
        self.create(new, &seed.password, Role::Admin).await?;
        Ok(true)
    }

    /// Grant an additional role to an existing account.
    pub async fn assign_role(&self, id: &str, role: Role) -> AppResult<()> {
        self.store.assign_role(id, role).await?;
        info!(account_id = %id, role = %role, "role assigned");
        Ok(())
    }
}
