//! Login flow: verify credentials, then issue a session token.

use chrono::{DateTime, Utc};
use tracing::info;

use super::token::SessionIssuer;
use super::verifier::CredentialVerifier;
use crate::error::AppResult;
use crate::models::Account;

/// A freshly authenticated account and its signed token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub token: String,
}

#[derive(Clone)]
pub struct Authenticator {
    verifier: CredentialVerifier,
    issuer: SessionIssuer,
}

impl Authenticator {
    pub fn new(verifier: CredentialVerifier, issuer: SessionIssuer) -> Self {
        Self { verifier, issuer }
    }

    pub fn issuer(&self) -> &SessionIssuer {
        &self.issuer
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Session> {
        let account = self.verifier.verify(username, password).await?;
        let token = self.issuer.issue(&account, now)?;
        info!(account_id = %account.id, roles = account.roles.len(), "session issued");
        Ok(Session { account, token })
    }
}
