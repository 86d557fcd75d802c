//! Protected user-management endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::AuthUser;
use crate::models::{AccountView, Envelope, Role};
use crate::services::AccountUpdate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: Role,
}

/// GET /users: Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Envelope<Vec<AccountView>>>, AppError> {
    user.require_any(&[Role::Admin])?;
    let accounts = state.accounts().list().await?;
    Ok(Json(Envelope::success(
        accounts.iter().map(AccountView::from).collect(),
    )))
}

/// GET /users/:id: Admin or Member. Unknown ids yield `data: null`.
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Option<AccountView>>>, AppError> {
    user.require_any(&[Role::Admin, Role::Member])?;
    let account = state.accounts().get(&id).await?;
    Ok(Json(Envelope::success(account.as_ref().map(AccountView::from))))
}

/// PUT /users/:id: Admin only.
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UpdatedUser>, AppError> {
    user.require_any(&[Role::Admin])?;
    let update = AccountUpdate {
        username: body.username,
        first_name: body.first_name,
        last_name: body.last_name,
        password: body.password,
    };
    let account = state.accounts().update(&id, update).await?;
    Ok(Json(UpdatedUser {
        username: account.username,
        first_name: account.first_name,
        last_name: account.last_name,
    }))
}

/// DELETE /users/:id: Admin only.
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<(), AppError> {
    user.require_any(&[Role::Admin])?;
    state.accounts().delete(&id).await
}

/// POST /users/:id/roles: Admin only.
pub async fn assign_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    user.require_any(&[Role::Admin])?;
    state.accounts().assign_role(&id, body.role).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
