//! Session tokens: HS256 JWTs carrying the subject and its role set.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigLoadError, DEFAULT_TOKEN_TTL_DAYS};
use crate::models::{Account, Role};

/// Value of `tokenType` returned alongside a session token.
pub const TOKEN_TYPE: &str = "Bearer";

/// Claims carried by a session token. Times are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account identifier.
    pub sub: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role.as_str())
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has_role(*r))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and validates session tokens with one process-wide symmetric key.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    /// Build an issuer. An empty secret or a horizon that cannot be added to
    /// the current time is a configuration fault.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, ConfigLoadError> {
        if secret.is_empty() {
            return Err(ConfigLoadError::MissingJwtSecret);
        }
        if ttl <= Duration::zero() || Utc::now().checked_add_signed(ttl).is_none() {
            return Err(ConfigLoadError::InvalidTokenTtl(ttl.to_string()));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    /// Issuer with the standard seven day horizon.
    pub fn with_default_ttl(secret: &[u8]) -> Result<Self, ConfigLoadError> {
        Self::new(secret, Duration::days(DEFAULT_TOKEN_TTL_DAYS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `account`, valid from `now` until `now + ttl`.
    pub fn issue(&self, account: &Account, now: DateTime<Utc>) -> Result<String, TokenError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;
        let claims = SessionClaims {
            sub: account.id.clone(),
            roles: account.roles.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry as of `now`. A token is expired from its `exp` instant on.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Expiry is checked below against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            },
        )?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn alice(roles: &[&str]) -> Account {
        Account {
            id: "u1".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            password_hash: String::new(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_secret_is_a_configuration_fault() {
        assert!(matches!(
            SessionIssuer::with_default_ttl(b""),
            Err(ConfigLoadError::MissingJwtSecret)
        ));
    }

    #[test]
    fn unrepresentable_horizon_is_a_configuration_fault() {
        assert!(matches!(
            SessionIssuer::new(b"test-secret", Duration::days(100_000_000)),
            Err(ConfigLoadError::InvalidTokenTtl(_))
        ));
        assert!(matches!(
            SessionIssuer::new(b"test-secret", Duration::zero()),
            Err(ConfigLoadError::InvalidTokenTtl(_))
        ));
    }

    #[test]
    fn issuing_near_the_end_of_time_errors_instead_of_panicking() {
        let issuer = SessionIssuer::with_default_ttl(b"test-secret").unwrap();
        let result = issuer.issue(&alice(&["Member"]), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn issued_token_is_compact_three_part() {
        let issuer = SessionIssuer::with_default_ttl(b"test-secret").unwrap();
        let token = issuer.issue(&alice(&["Member"]), t0()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));
    }

    #[test]
    fn alice_session_scenario() {
        let issuer = SessionIssuer::with_default_ttl(b"test-secret").unwrap();
        let token = issuer.issue(&alice(&["Member"]), t0()).unwrap();

        let claims = issuer.validate(&token, t0() + Duration::hours(1)).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.roles, BTreeSet::from(["Member".to_string()]));
        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.expires_at(), Some(t0() + Duration::days(7)));

        assert_eq!(
            issuer.validate(&token, t0() + Duration::days(8)),
            Err(TokenError::Expired)
        );

        let wrong = SessionIssuer::with_default_ttl(b"wrong-secret").unwrap();
        assert_eq!(
            wrong.validate(&token, t0() + Duration::hours(1)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn roles_claim_matches_membership_exactly() {
        let issuer = SessionIssuer::with_default_ttl(b"test-secret").unwrap();
        for roles in [vec![], vec!["Admin"], vec!["Admin", "Member"]] {
            let token = issuer.issue(&alice(&roles), t0()).unwrap();
            let claims = issuer.validate(&token, t0()).unwrap();
            let expected: BTreeSet<String> = roles.iter().map(|r| r.to_string()).collect();
            assert_eq!(claims.roles, expected);
        }
    }

    #[test]
    fn expiry_boundary() {
        let issuer = SessionIssuer::with_default_ttl(b"test-secret").unwrap();
        let token = issuer.issue(&alice(&["Member"]), t0()).unwrap();
        let exp = t0() + Duration::days(7);

        assert!(issuer.validate(&token, exp - Duration::seconds(1)).is_ok());
        assert_eq!(issuer.validate(&token, exp), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let issuer = SessionIssuer::with_default_ttl(b"test-secret").unwrap();
        let member = issuer.issue(&alice(&["Member"]), t0()).unwrap();
        let admin = issuer.issue(&alice(&["Admin"]), t0()).unwrap();

        let m: Vec<&str> = member.split('.').collect();
        let a: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", m[0], a[1], m[2]);
        assert_eq!(
            issuer.validate(&forged, t0()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = SessionIssuer::with_default_ttl(b"test-secret").unwrap();
        assert!(matches!(
            issuer.validate("not-a-token", t0()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn custom_ttl_is_honoured() {
        let issuer = SessionIssuer::new(b"test-secret", Duration::hours(2)).unwrap();
        let token = issuer.issue(&alice(&[]), t0()).unwrap();
        let claims = issuer.validate(&token, t0()).unwrap();
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }
}
