//! Anonymous user endpoints: authenticate, register.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::TOKEN_TYPE;
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::{Envelope, FieldError};
use crate::services::NewAccount;

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub token_type: &'static str,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 256, message = "Username is required"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "Passwords must be at least 6 characters"))]
    #[serde(default)]
    pub password: String,
    #[validate(length(max = 256))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 256))]
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// POST /users/authenticate
pub async fn authenticate(
    State(state): State<AppState>,
    Json(body): Json<AuthenticateRequest>,
) -> Result<Json<Envelope<AuthenticatedUser>>, AppError> {
    let session = state
        .authenticator()
        .authenticate(&body.username, &body.password, Utc::now())
        .await?;
    let account = session.account;

    Ok(Json(Envelope::success(AuthenticatedUser {
        id: account.id,
        username: account.username,
        first_name: account.first_name,
        last_name: account.last_name,
        token_type: TOKEN_TYPE,
        token: session.token,
    })))
}

/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    if let Err(errors) = body.validate() {
        let body = Envelope::fail(field_errors(&errors));
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    let new = NewAccount {
        username: body.username,
        first_name: body.first_name,
        last_name: body.last_name,
    };
    let account = state.accounts().register(new, &body.password).await?;

    Ok(Json(Envelope::success(RegisteredUser {
        username: account.username,
        first_name: account.first_name,
        last_name: account.last_name,
    }))
    .into_response())
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                code: e.code.to_string(),
                description: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            })
        })
        .collect();
    out.sort_by(|a, b| a.description.cmp(&b.description));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_validation_messages() {
        let req = RegisterRequest {
            username: String::new(),
            password: "abc".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        let errors = req.validate().unwrap_err();
        let described: Vec<String> = field_errors(&errors)
            .into_iter()
            .map(|e| e.description)
            .collect();
        assert_eq!(
            described,
            vec![
                "Passwords must be at least 6 characters".to_string(),
                "Username is required".to_string(),
            ]
        );
    }

    #[test]
    fn authenticated_user_serializes_camel_case() {
        let json = serde_json::to_value(AuthenticatedUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            token_type: TOKEN_TYPE,
            token: "a.b.c".to_string(),
        })
        .unwrap();
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["token"], "a.b.c");
    }
}
