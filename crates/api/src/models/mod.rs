//! Domain models for the recipes API.
//!
//! Each entity has three shapes:
//! - the stored record (`User`, `Recipe`, `Ingredient`), decoded from the store
//! - the write inputs (`New*` for creation, `*Changes` for partial updates),
//!   deserialized from an already-validated payload
//! - the wire documents, where references are either bare ids or a populated
//!   summary of the referenced entity

pub mod ingredient;
pub mod recipe;
pub mod user;

use core::fmt;

pub use ingredient::{Ingredient, IngredientDoc, NewIngredient, RecipeRef, RecipeWithOwnerRef};
pub use recipe::{NewRecipe, OwnerSummary, Recipe, RecipeChanges, RecipeDetail, RecipeDoc};
pub use user::{NewUser, User, UserChanges};

/// The three entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Recipe,
    Ingredient,
}

impl Entity {
    /// Client-facing message when an entity of this kind does not exist.
    #[must_use]
    pub const fn not_found_message(self) -> &'static str {
        match self {
            Self::User => "Usuario no encontrado",
            Self::Recipe => "Receta no encontrada",
            Self::Ingredient => "Ingrediente no encontrado",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Recipe => "recipe",
            Self::Ingredient => "ingredient",
        })
    }
}
