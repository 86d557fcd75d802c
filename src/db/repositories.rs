//! PostgreSQL account store: `users` plus `user_roles` membership rows.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sqlx::FromRow;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Account, Role};
use crate::repositories::AccountStore;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    first_name: String,
    last_name: String,
    password_hash: String,
}

impl UserRow {
    fn into_account(self, roles: BTreeSet<String>) -> Account {
        Account {
            id: self.id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            roles,
        }
    }
}

const USER_COLUMNS: &str = "id, username, first_name, last_name, password_hash";

/// Map a unique-constraint violation on `users.username` to a validation error.
fn map_unique(e: sqlx::Error, username: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::username_taken(username),
        _ => AppError::Db(e),
    }
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn roles_of(&self, id: &str) -> AppResult<BTreeSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(r,)| r).collect())
    }

    async fn with_roles(&self, row: Option<UserRow>) -> AppResult<Option<Account>> {
        match row {
            Some(row) => {
                let roles = self.roles_of(&row.id).await?;
                Ok(Some(row.into_account(roles)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        self.with_roles(row).await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.with_roles(row).await
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY username",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let memberships: Vec<(String, String)> =
            sqlx::query_as("SELECT user_id, role FROM user_roles")
                .fetch_all(&self.pool)
                .await?;
        let mut roles: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (user_id, role) in memberships {
            roles.entry(user_id).or_default().insert(role);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let r = roles.remove(&row.id).unwrap_or_default();
                row.into_account(r)
            })
            .collect())
    }

    async fn insert(&self, account: &Account) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique(e, &account.username))?;

        for role in &account.roles {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(&account.id)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, account: &Account) -> AppResult<()> {
        let r = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, first_name = $3, last_name = $4, password_hash = $5
            WHERE id = $1
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, &account.username))?;
        if r.rows_affected() == 0 {
            return Err(AppError::user_not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let r = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }

    async fn assign_role(&self, id: &str, role: Role) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::user_not_found(),
            _ => AppError::Db(e),
        })?;
        Ok(())
    }
}
