//! Ingredient repository for database operations.

use sqlx::{PgPool, Postgres, QueryBuilder};

use culinary_core::IngredientId;

use super::{read_error, write_error};
use crate::models::{Ingredient, NewIngredient};
use crate::query::IngredientFilter;
use crate::store::StoreError;

const COLUMNS: &str = "id, name, quantity, unit, recipe_id, version, created_at, updated_at";

/// Repository for ingredient database operations.
pub struct IngredientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IngredientRepository<'a> {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List ingredients matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn list(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM culinary.ingredients WHERE TRUE"
        ));

        if let Some(name) = &filter.name {
            qb.push(" AND name ILIKE ").push_bind(name.like_pattern());
        }
        if let Some(recipes) = &filter.recipe_ids {
            qb.push(" AND recipe_id = ANY(")
                .push_bind(recipes.clone())
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        qb.build_query_as::<Ingredient>()
            .fetch_all(self.pool)
            .await
            .map_err(read_error)
    }

    /// Add an ingredient to a recipe.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the recipe already has an ingredient
    /// with this name, `StoreError::MissingReference` if the recipe does not
    /// exist, and `StoreError::Database` for other database errors.
    pub async fn create(&self, new: &NewIngredient) -> Result<Ingredient, StoreError> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "INSERT INTO culinary.ingredients (name, quantity, unit, recipe_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.quantity)
        .bind(new.unit)
        .bind(new.recipe_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, || new.name.clone()))
    }

    /// Delete an ingredient, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn delete(&self, id: IngredientId) -> Result<Option<Ingredient>, StoreError> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "DELETE FROM culinary.ingredients WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(read_error)
    }
}
