use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Pool, Postgres};
use std::str::FromStr;

use crate::error::{LeafError, LeafResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> LeafResult<DbPool> {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> LeafResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| LeafError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Prefer);

    init_pool_with_options(opts).await
}

/// Applies pending migrations. Zones are seeded by the initial migration.
pub async fn init_database(pool: &DbPool) -> LeafResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    let zones: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM zones")
        .fetch_one(pool)
        .await?;
    tracing::info!("Database ready ({} zone(s) configured)", zones.0);

    Ok(())
}
