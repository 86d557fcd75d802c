//! Credential verification: username lookup plus password hash check.

use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::debug;

use super::password::{hash_password, verify_password_blocking};
use crate::error::AppResult;
use crate::models::Account;
use crate::repositories::AccountStore;

/// Uniform credential rejection. Carries no detail so unknown usernames and
/// wrong passwords are indistinguishable to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Username or password is incorrect")]
pub struct AuthFailure;

/// Checks a username/password pair against the account store.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn AccountStore>,
    /// Compared against on lookup miss so both paths pay for one hash.
    dummy_hash: Arc<str>,
    #[cfg(test)]
    hash_checks: Arc<AtomicUsize>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn AccountStore>) -> AppResult<Self> {
        let dummy_hash = hash_password("dummy-password-for-missing-accounts")?;
        Ok(Self {
            store,
            dummy_hash: dummy_hash.into(),
            #[cfg(test)]
            hash_checks: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Return the account when `password` matches its stored hash.
    ///
    /// Empty input fails before the store is consulted. Store errors are
    /// propagated as-is; every credential mismatch is [`AuthFailure`].
    pub async fn verify(&self, username: &str, password: &str) -> AppResult<Account> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthFailure.into());
        }

        let account = self.store.find_by_username(username).await?;
        let hash = match &account {
            Some(a) => a.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };
        let matches = self.check(password, hash).await?;

        match account {
            Some(account) if matches => Ok(account),
            Some(account) => {
                debug!(account_id = %account.id, "authentication rejected");
                Err(AuthFailure.into())
            }
            None => {
                debug!("authentication rejected");
                Err(AuthFailure.into())
            }
        }
    }

    async fn check(&self, password: &str, hash: String) -> AppResult<bool> {
        #[cfg(test)]
        self.hash_checks.fetch_add(1, Ordering::SeqCst);
        verify_password_blocking(password.to_string(), hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Role;
    use crate::repositories::MemoryAccountStore;
    use async_trait::async_trait;
    use std::collections::BTreeSet;

    /// Store that must never be reached.
    struct UnreachableStore;

    #[async_trait]
    impl AccountStore for UnreachableStore {
        async fn find_by_username(&self, _: &str) -> AppResult<Option<Account>> {
            panic!("store consulted")
        }
        async fn find_by_id(&self, _: &str) -> AppResult<Option<Account>> {
            panic!("store consulted")
        }
        async fn list(&self) -> AppResult<Vec<Account>> {
            panic!("store consulted")
        }
        async fn insert(&self, _: &Account) -> AppResult<()> {
            panic!("store consulted")
        }
        async fn update(&self, _: &Account) -> AppResult<()> {
            panic!("store consulted")
        }
        async fn delete(&self, _: &str) -> AppResult<bool> {
            panic!("store consulted")
        }
        async fn assign_role(&self, _: &str, _: Role) -> AppResult<()> {
            panic!("store consulted")
        }
    }

    async fn store_with_alice() -> Arc<MemoryAccountStore> {
        let store = Arc::new(MemoryAccountStore::new());
        store
            .insert(&Account {
                id: "u1".to_string(),
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Liddell".to_string(),
                password_hash: hash_password("wonderland").unwrap(),
                roles: BTreeSet::from(["Member".to_string()]),
            })
            .await
            .unwrap();
        store
    }

    fn is_auth_failure<T>(r: &AppResult<T>) -> bool {
        matches!(r, Err(AppError::Credentials(AuthFailure)))
    }

    #[tokio::test]
    async fn correct_password_returns_account() {
        let verifier = CredentialVerifier::new(store_with_alice().await).unwrap();
        let account = verifier.verify("alice", "wonderland").await.unwrap();
        assert_eq!(account.id, "u1");
        assert!(account.has_role(Role::Member));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_alike() {
        let verifier = CredentialVerifier::new(store_with_alice().await).unwrap();
        let wrong = verifier.verify("alice", "looking-glass").await;
        let unknown = verifier.verify("bob", "wonderland").await;
        assert!(is_auth_failure(&wrong));
        assert!(is_auth_failure(&unknown));
        assert_eq!(
            wrong.unwrap_err().to_string(),
            unknown.unwrap_err().to_string()
        );
    }

    #[tokio::test]
    async fn every_lookup_pays_for_one_hash_comparison() {
        let verifier = CredentialVerifier::new(store_with_alice().await).unwrap();
        let checks = || verifier.hash_checks.load(Ordering::SeqCst);

        assert!(is_auth_failure(&verifier.verify("bob", "wonderland").await));
        assert_eq!(checks(), 1);
        assert!(is_auth_failure(&verifier.verify("alice", "looking-glass").await));
        assert_eq!(checks(), 2);
        verifier.verify("alice", "wonderland").await.unwrap();
        assert_eq!(checks(), 3);
        assert!(is_auth_failure(&verifier.verify("", "wonderland").await));
        assert_eq!(checks(), 3);
    }

    #[tokio::test]
    async fn unknown_user_with_the_dummy_plaintext_still_fails() {
        let verifier = CredentialVerifier::new(store_with_alice().await).unwrap();
        let result = verifier
            .verify("bob", "dummy-password-for-missing-accounts")
            .await;
        assert!(is_auth_failure(&result));
    }

    #[tokio::test]
    async fn username_match_is_case_sensitive() {
        let verifier = CredentialVerifier::new(store_with_alice().await).unwrap();
        assert!(is_auth_failure(&verifier.verify("Alice", "wonderland").await));
    }

    #[tokio::test]
    async fn empty_input_fails_without_store_lookup() {
        let verifier = CredentialVerifier::new(Arc::new(UnreachableStore)).unwrap();
        assert!(is_auth_failure(&verifier.verify("", "wonderland").await));
        assert!(is_auth_failure(&verifier.verify("alice", "").await));
        assert!(is_auth_failure(&verifier.verify("", "").await));
    }
}
