//! Shared application state and the health check.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::{Authenticator, CredentialVerifier, SessionIssuer};
use crate::error::AppResult;
use crate::repositories::AccountStore;
use crate::services::AccountService;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub authenticator: Authenticator,
}

impl AppState {
    /// Wire services around one account store and one token issuer.
    pub fn new(store: Arc<dyn AccountStore>, issuer: SessionIssuer) -> AppResult<Self> {
        let verifier = CredentialVerifier::new(store.clone())?;
        Ok(Self {
            accounts: AccountService::new(store),
            authenticator: Authenticator::new(verifier, issuer),
        })
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

/// GET /health: liveness check.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "accounts" })),
    )
}
