//! Authentication: password hashing, credential verification, session tokens.

mod authenticator;
mod handlers;
mod password;
mod token;
mod verifier;

pub use authenticator::{Authenticator, Session};
pub use handlers::{authenticate, register};
pub use password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};
pub use token::{SessionClaims, SessionIssuer, TokenError, TOKEN_TYPE};
pub use verifier::{AuthFailure, CredentialVerifier};
