//! The entity store seam.
//!
//! Handlers talk to an `Arc<dyn Store>`. Two backends implement it:
//!
//! - [`crate::db::PgStore`] - `PostgreSQL`, used in production
//! - [`memory::MemoryStore`] - in-process, used by tests and `CULINARY_STORE=memory`
//!
//! Both enforce the same uniqueness constraints and report them through
//! [`StoreError::Conflict`], and both execute a [`CascadePlan`] as one unit.

pub mod memory;

use core::fmt;

use async_trait::async_trait;

use culinary_core::{IngredientId, RecipeId, UserId};

use crate::integrity::{CascadePlan, CascadeReport};
use crate::models::{
    Entity, Ingredient, NewIngredient, NewRecipe, NewUser, Recipe, RecipeChanges, User,
    UserChanges,
};
use crate::query::{IngredientFilter, RecipeFilter, UserFilter};

pub use memory::MemoryStore;

/// A uniqueness rule enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    /// No two users share an email.
    UserEmail,
    /// An ingredient name appears once per recipe.
    IngredientPerRecipe,
}

impl UniqueConstraint {
    /// Map a `PostgreSQL` constraint name to the rule it enforces.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "users_email_key" => Some(Self::UserEmail),
            "ingredients_recipe_name_key" => Some(Self::IngredientPerRecipe),
            _ => None,
        }
    }

    /// Client-facing message for the collision.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UserEmail => "El email ya existe",
            Self::IngredientPerRecipe => "Este ingrediente ya existe en la receta",
        }
    }
}

impl fmt::Display for UniqueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UserEmail => "user email",
            Self::IngredientPerRecipe => "ingredient name per recipe",
        })
    }
}

/// Errors that can occur in store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate {constraint}: {value}")]
    Conflict {
        constraint: UniqueConstraint,
        value: String,
    },

    /// The write referenced an entity that does not exist.
    #[error("referenced {0} does not exist")]
    MissingReference(Entity),

    /// A delete would leave rows pointing at a removed entity.
    #[error("{0} is still referenced")]
    StillReferenced(Entity),

    /// Data in the store could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Persistence operations needed by the API.
///
/// List reads return newest first and honour the filter's `limit`. Lookups
/// by id return `Ok(None)` for a missing entity. Updates bump the entity's
/// version and `updated_at`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError>;

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError>;
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;
    async fn insert_recipe(&self, new: NewRecipe) -> Result<Recipe, StoreError>;
    async fn update_recipe(
        &self,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, StoreError>;

    async fn list_ingredients(
        &self,
        filter: &IngredientFilter,
    ) -> Result<Vec<Ingredient>, StoreError>;
    async fn insert_ingredient(&self, new: NewIngredient) -> Result<Ingredient, StoreError>;
    async fn delete_ingredient(&self, id: IngredientId)
    -> Result<Option<Ingredient>, StoreError>;

    /// Run every step of the plan, in order, as a single unit.
    async fn execute_cascade(&self, plan: &CascadePlan) -> Result<CascadeReport, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release connections held by the store.
    async fn close(&self);
}
