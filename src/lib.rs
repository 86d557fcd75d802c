//! User account service: registration, role-based access and stateless bearer sessions.
//!
//! Credentials are checked against Argon2 hashes; successful logins receive an
//! HS256 session token carrying the account id and its roles.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::http::AppState;
pub use repositories::{AccountStore, MemoryAccountStore};
pub use services::AccountService;

use axum::routing::{get, post};
use handlers::{http, users};
use tower_http::trace::TraceLayer;

/// Build the API router (health, authentication, user management). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let user_routes = axum::Router::new()
        .route("/authenticate", post(auth::authenticate))
        .route("/register", post(auth::register))
        .route("/", get(users::list_users))
        .route(
            "/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/:id/roles", post(users::assign_role));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/users", user_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
