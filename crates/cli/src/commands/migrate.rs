//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded into the API
//! crate at compile time.

use culinary_api::db::MIGRATOR;

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    pool.close().await;
    Ok(())
}
