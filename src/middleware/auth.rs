//! Bearer-token extractor for protected user endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::Utc;
use tracing::debug;

use crate::auth::SessionClaims;
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::Role;

/// Extractor: validated session claims from `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    /// Fails with 403 unless the session holds at least one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AppError> {
        if self.0.has_any_role(roles) {
            return Ok(());
        }
        debug!(account_id = %self.0.sub, "role check failed");
        let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
        Err(AppError::Forbidden(format!(
            "Requires role: {}",
            names.join(" or ")
        )))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                })?;
        let claims = state
            .authenticator()
            .issuer()
            .validate(bearer.token(), Utc::now())?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn user(roles: &[&str]) -> AuthUser {
        AuthUser(SessionClaims {
            sub: "u1".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect::<BTreeSet<_>>(),
            iat: 0,
            exp: 1,
        })
    }

    #[test]
    fn require_any_accepts_matching_role() {
        assert!(user(&["Member"]).require_any(&[Role::Admin, Role::Member]).is_ok());
        assert!(user(&["Admin"]).require_any(&[Role::Admin]).is_ok());
    }

    #[test]
    fn require_any_rejects_missing_role() {
        let err = user(&["Member"]).require_any(&[Role::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Requires role: Admin"));
        assert!(user(&[]).require_any(&[Role::Admin, Role::Member]).is_err());
    }
}
