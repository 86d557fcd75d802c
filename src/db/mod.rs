//! Database layer: pool, migrations and the PostgreSQL account store.

mod pool;
mod repositories;

pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::PgAccountStore;
