//! Recipe repository for database operations.

use sqlx::{PgPool, Postgres, QueryBuilder};

use culinary_core::RecipeId;

use super::{read_error, write_error};
use crate::models::{NewRecipe, Recipe, RecipeChanges};
use crate::query::RecipeFilter;
use crate::store::StoreError;

const COLUMNS: &str = "id, title, description, instructions, cooking_time_minutes, difficulty, \
                       owner_id, version, created_at, updated_at";

/// Repository for recipe database operations.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List recipes matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn list(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM culinary.recipes WHERE TRUE"));

        if let Some(title) = &filter.title {
            qb.push(" AND title ILIKE ").push_bind(title.like_pattern());
        }
        if let Some(text) = &filter.text {
            let pattern = text.like_pattern();
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR instructions ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(difficulty) = filter.difficulty {
            qb.push(" AND difficulty = ").push_bind(difficulty);
        }
        if let Some(owners) = &filter.owner_ids {
            qb.push(" AND owner_id = ANY(").push_bind(owners.clone()).push(")");
        }
        if let Some(ids) = &filter.ids {
            qb.push(" AND id = ANY(").push_bind(ids.clone()).push(")");
        }

        qb.push(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        qb.build_query_as::<Recipe>()
            .fetch_all(self.pool)
            .await
            .map_err(read_error)
    }

    /// Get a recipe by its ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {COLUMNS} FROM culinary.recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(read_error)
    }

    /// Create a new recipe.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingReference` if the owner does not exist.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(&self, new: &NewRecipe) -> Result<Recipe, StoreError> {
        sqlx::query_as::<_, Recipe>(&format!(
            "INSERT INTO culinary.recipes
                 (title, description, instructions, cooking_time_minutes, difficulty, owner_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.instructions)
        .bind(new.cooking_time_minutes)
        .bind(new.difficulty)
        .bind(new.owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, || new.title.clone()))
    }

    /// Apply a partial update, bumping the version. The owner never changes.
    ///
    /// Returns `None` if the recipe does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn update(
        &self,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, StoreError> {
        sqlx::query_as::<_, Recipe>(&format!(
            "UPDATE culinary.recipes
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 instructions = COALESCE($4, instructions),
                 cooking_time_minutes = COALESCE($5, cooking_time_minutes),
                 difficulty = COALESCE($6, difficulty),
                 version = version + 1,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.instructions)
        .bind(changes.cooking_time_minutes)
        .bind(changes.difficulty)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| write_error(e, String::new))
    }
}
