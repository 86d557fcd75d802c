//! Entry point: load config, wire dependencies, and run the server.

use accounts::auth::SessionIssuer;
use accounts::config::{Config, RECOMMENDED_SECRET_LEN};
use accounts::db::{self, PgAccountStore};
use accounts::{create_app, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.jwt_secret.len() < RECOMMENDED_SECRET_LEN {
        tracing::warn!(
            len = config.jwt_secret.len(),
            recommended = RECOMMENDED_SECRET_LEN,
            "JWT_SECRET is short"
        );
    }
    let issuer = SessionIssuer::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::days(config.token_ttl_days),
    )
    .map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;
    let store = Arc::new(PgAccountStore::new(db_pool));

    let state = AppState::new(store, issuer)?;

    if let Some(seed) = &config.seed_admin {
        if state.accounts().ensure_admin(seed).await? {
            tracing::info!(username = %seed.username, "seeded admin account");
        }
    }

    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
