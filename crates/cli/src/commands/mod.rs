//! CLI command implementations.

pub mod migrate;
pub mod seed;

use culinary_api::config::ApiConfig;
use culinary_api::db;
use sqlx::PgPool;

/// Load configuration and connect to the database.
async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env()?;
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok(pool)
}
