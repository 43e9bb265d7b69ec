//! Ingredient domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use culinary_core::{IngredientId, RecipeId, Unit, UserId};

use super::recipe::Recipe;

/// A stored ingredient.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub quantity: String,
    pub unit: Unit,
    pub recipe_id: RecipeId,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Render as a wire document with the recipe shaped as `R`.
    #[must_use]
    pub fn into_doc<R>(self, recipe: R) -> IngredientDoc<R> {
        IngredientDoc {
            id: self.id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            recipe,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Wire form of an ingredient; `R` is the shape of the recipe reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDoc<R> {
    #[serde(rename = "_id")]
    pub id: IngredientId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: String,
    #[serde(rename = "unidad")]
    pub unit: Unit,
    #[serde(rename = "receta")]
    pub recipe: R,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recipe fields attached to a populated ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRef {
    #[serde(rename = "_id")]
    pub id: RecipeId,
    #[serde(rename = "titulo")]
    pub title: String,
}

impl From<&Recipe> for RecipeRef {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
        }
    }
}

/// Recipe fields attached to ingredients in the full ingredient listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeWithOwnerRef {
    #[serde(rename = "_id")]
    pub id: RecipeId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "usuario")]
    pub owner: UserId,
}

impl From<&Recipe> for RecipeWithOwnerRef {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            owner: recipe.owner_id,
        }
    }
}

/// Fields for creating an ingredient.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: String,
    #[serde(rename = "unidad")]
    pub unit: Unit,
    #[serde(rename = "receta")]
    pub recipe_id: RecipeId,
}
