//! `PostgreSQL` persistence.
//!
//! # Schema: `culinary`
//!
//! - `users` - unique on `email` (`users_email_key`)
//! - `recipes` - `owner_id` references `users` (`recipes_owner_id_fkey`)
//! - `ingredients` - `recipe_id` references `recipes`
//!   (`ingredients_recipe_id_fkey`), unique on `(recipe_id, name)`
//!   (`ingredients_recipe_name_key`)
//!
//! Foreign keys are `ON DELETE RESTRICT`; cascades are executed by
//! [`PgStore::execute_cascade`] inside a single transaction.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/`, are embedded as
//! [`MIGRATOR`], and run via:
//! ```bash
//! cargo run -p culinary-cli -- migrate
//! ```

mod ingredients;
mod recipes;
mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use culinary_core::{IngredientId, RecipeId, UserId};

pub use ingredients::IngredientRepository;
pub use recipes::RecipeRepository;
pub use users::UserRepository;

use crate::integrity::{CascadePlan, CascadeReport, CascadeStep};
use crate::models::{
    Entity, Ingredient, NewIngredient, NewRecipe, NewUser, Recipe, RecipeChanges, User,
    UserChanges,
};
use crate::query::{IngredientFilter, RecipeFilter, UserFilter};
use crate::store::{Store, StoreError, UniqueConstraint};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Classify a failed read. Undecodable columns are corruption, not outages.
fn read_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::DataCorruption(format!("column {index}: {source}"))
        }
        other => StoreError::Database(other),
    }
}

/// Classify a failed insert or update by the constraint it tripped.
fn write_error(err: sqlx::Error, value: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation()
            && let Some(constraint) = db_err.constraint().and_then(UniqueConstraint::from_name)
        {
            return StoreError::Conflict {
                constraint,
                value: value(),
            };
        }
        if db_err.is_foreign_key_violation() {
            match db_err.constraint() {
                Some("recipes_owner_id_fkey") => {
                    return StoreError::MissingReference(Entity::User);
                }
                Some("ingredients_recipe_id_fkey") => {
                    return StoreError::MissingReference(Entity::Recipe);
                }
                _ => {}
            }
        }
    }
    StoreError::Database(err)
}

/// Classify a failed delete. A foreign key violation means a dependent row
/// appeared after the cascade was planned.
fn delete_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        match db_err.constraint() {
            Some("recipes_owner_id_fkey") => return StoreError::StillReferenced(Entity::User),
            Some("ingredients_recipe_id_fkey") => {
                return StoreError::StillReferenced(Entity::Recipe);
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// The production store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        UserRepository::new(&self.pool).list(filter).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        UserRepository::new(&self.pool).get_by_id(id).await
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        UserRepository::new(&self.pool).create(&new).await
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        UserRepository::new(&self.pool).update(id, &changes).await
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError> {
        RecipeRepository::new(&self.pool).list(filter).await
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        RecipeRepository::new(&self.pool).get_by_id(id).await
    }

    async fn insert_recipe(&self, new: NewRecipe) -> Result<Recipe, StoreError> {
        RecipeRepository::new(&self.pool).create(&new).await
    }

    async fn update_recipe(
        &self,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, StoreError> {
        RecipeRepository::new(&self.pool).update(id, &changes).await
    }

    async fn list_ingredients(
        &self,
        filter: &IngredientFilter,
    ) -> Result<Vec<Ingredient>, StoreError> {
        IngredientRepository::new(&self.pool).list(filter).await
    }

    async fn insert_ingredient(&self, new: NewIngredient) -> Result<Ingredient, StoreError> {
        IngredientRepository::new(&self.pool).create(&new).await
    }

    async fn delete_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, StoreError> {
        IngredientRepository::new(&self.pool).delete(id).await
    }

    async fn execute_cascade(&self, plan: &CascadePlan) -> Result<CascadeReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut report = CascadeReport::default();

        for step in plan.steps() {
            match step {
                CascadeStep::IngredientsOfRecipes(ids) => {
                    report.ingredients += sqlx::query(
                        "DELETE FROM culinary.ingredients WHERE recipe_id = ANY($1)",
                    )
                    .bind(ids.as_slice())
                    .execute(&mut *tx)
                    .await
                    .map_err(delete_error)?
                    .rows_affected();
                }
                CascadeStep::Recipes(ids) => {
                    report.recipes += sqlx::query("DELETE FROM culinary.recipes WHERE id = ANY($1)")
                        .bind(ids.as_slice())
                        .execute(&mut *tx)
                        .await
                        .map_err(delete_error)?
                        .rows_affected();
                }
                CascadeStep::Users(ids) => {
                    report.users += sqlx::query("DELETE FROM culinary.users WHERE id = ANY($1)")
                        .bind(ids.as_slice())
                        .execute(&mut *tx)
                        .await
                        .map_err(delete_error)?
                        .rows_affected();
                }
            }
        }

        tx.commit().await?;
        Ok(report)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
