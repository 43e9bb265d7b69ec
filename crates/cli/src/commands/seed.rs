//! Dataset loading and reset commands.

use std::path::Path;

use culinary_api::db::PgStore;
use culinary_api::integrity::cascade_delete_many_users;
use culinary_api::query::UserFilter;
use culinary_api::seed::{self, Dataset};
use culinary_api::store::Store;
use tracing::info;

/// Load a dataset into the database.
///
/// Without `file` the bundled sample dataset is used. Unless `keep` is set,
/// all existing data is removed first.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a record fails
/// validation, or a database operation fails.
pub async fn run(file: Option<&Path>, keep: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Parse before connecting so a bad file fails fast
    let dataset = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading dataset from file");
            let content = tokio::fs::read_to_string(path).await?;
            Dataset::from_yaml(&content)?
        }
        None => Dataset::embedded()?,
    };
    info!(
        users = dataset.users.len(),
        recipes = dataset.recipes.len(),
        "Parsed dataset"
    );

    let store = PgStore::new(super::connect().await?);
    let report = seed::seed(&store, &dataset, keep).await?;

    info!(
        cleared_users = report.cleared.users,
        cleared_recipes = report.cleared.recipes,
        cleared_ingredients = report.cleared.ingredients,
        users = report.users,
        recipes = report.recipes,
        ingredients = report.ingredients,
        skipped_recipes = report.skipped_recipes,
        "Seeding complete"
    );

    store.close().await;
    Ok(())
}

/// Delete every user, cascading to their recipes and ingredients.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn reset() -> Result<(), Box<dyn std::error::Error>> {
    let store = PgStore::new(super::connect().await?);
    let report = cascade_delete_many_users(&store, &UserFilter::default()).await?;

    info!(
        users = report.users,
        recipes = report.recipes,
        ingredients = report.ingredients,
        "Database reset"
    );

    store.close().await;
    Ok(())
}
