//! User repository for database operations.

use sqlx::{PgPool, Postgres, QueryBuilder};

use culinary_core::UserId;

use super::{read_error, write_error};
use crate::models::{NewUser, User, UserChanges};
use crate::query::UserFilter;
use crate::store::StoreError;

const COLUMNS: &str = "id, name, email, age, country, version, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List users matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM culinary.users WHERE TRUE"));

        if let Some(text) = &filter.text {
            let pattern = text.like_pattern();
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR country ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(ids) = &filter.ids {
            qb.push(" AND id = ANY(").push_bind(ids.clone()).push(")");
        }

        qb.push(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        qb.build_query_as::<User>()
            .fetch_all(self.pool)
            .await
            .map_err(read_error)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM culinary.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(read_error)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email already exists.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(&self, new: &NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO culinary.users (name, email, age, country)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.age)
        .bind(&new.country)
        .fetch_one(self.pool)
        .await
        .map_err(|e| write_error(e, || new.email.to_string()))
    }

    /// Apply a partial update, bumping the version.
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the new email belongs to another user.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE culinary.users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 age = COALESCE($4, age),
                 country = COALESCE($5, country),
                 version = version + 1,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(changes.age)
        .bind(&changes.country)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            write_error(e, || {
                changes
                    .email
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            })
        })
    }
}
