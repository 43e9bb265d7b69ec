//! Recipe domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use culinary_core::{Difficulty, Email, RecipeId, UserId};

use super::ingredient::IngredientDoc;
use super::user::User;

/// A stored recipe.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub cooking_time_minutes: i32,
    pub difficulty: Difficulty,
    pub owner_id: UserId,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Render as a wire document with the owner shaped as `O`.
    #[must_use]
    pub fn into_doc<O>(self, owner: O) -> RecipeDoc<O> {
        RecipeDoc {
            id: self.id,
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            cooking_time_minutes: self.cooking_time_minutes,
            difficulty: self.difficulty,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Wire form of a recipe.
///
/// `O` is [`UserId`] for an unpopulated owner or `Option<OwnerSummary>` when
/// populated (`None` renders as `null` for a dangling owner).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDoc<O> {
    #[serde(rename = "_id")]
    pub id: RecipeId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "instrucciones")]
    pub instructions: String,
    #[serde(rename = "tiempoCoccion")]
    pub cooking_time_minutes: i32,
    #[serde(rename = "dificultad")]
    pub difficulty: Difficulty,
    #[serde(rename = "usuario")]
    pub owner: O,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recipe with its owner populated and its ingredients inlined.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: RecipeDoc<Option<OwnerSummary>>,
    #[serde(rename = "ingredientes")]
    pub ingredients: Vec<IngredientDoc<RecipeId>>,
}

/// The owner fields attached to a populated recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: Email,
}

impl From<&User> for OwnerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Fields for creating a recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "instrucciones")]
    pub instructions: String,
    #[serde(rename = "tiempoCoccion")]
    pub cooking_time_minutes: i32,
    #[serde(rename = "dificultad", default)]
    pub difficulty: Difficulty,
    #[serde(rename = "usuario")]
    pub owner_id: UserId,
}

/// A partial recipe update. The owner cannot change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeChanges {
    #[serde(rename = "titulo", default)]
    pub title: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "instrucciones", default)]
    pub instructions: Option<String>,
    #[serde(rename = "tiempoCoccion", default)]
    pub cooking_time_minutes: Option<i32>,
    #[serde(rename = "dificultad", default)]
    pub difficulty: Option<Difficulty>,
}

impl RecipeChanges {
    /// Apply the supplied fields to a stored recipe.
    pub fn apply_to(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions;
        }
        if let Some(minutes) = self.cooking_time_minutes {
            recipe.cooking_time_minutes = minutes;
        }
        if let Some(difficulty) = self.difficulty {
            recipe.difficulty = difficulty;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_recipe_defaults_difficulty() {
        let new: NewRecipe = serde_json::from_value(json!({
            "titulo": "Tortilla",
            "descripcion": "Tortilla de patatas clásica",
            "instrucciones": "Pelar, freír y cuajar con huevo batido.",
            "tiempoCoccion": 30,
            "usuario": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        }))
        .unwrap();
        assert_eq!(new.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_changes_ignore_owner() {
        let changes: RecipeChanges = serde_json::from_value(json!({
            "titulo": "New Title",
            "usuario": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        }))
        .unwrap();
        assert_eq!(changes.title.as_deref(), Some("New Title"));
        assert!(changes.description.is_none());
    }

    #[test]
    fn test_doc_uses_wire_names() {
        let now = Utc::now();
        let recipe = Recipe {
            id: RecipeId::generate(),
            title: "Paella".to_owned(),
            description: "Arroz con marisco".to_owned(),
            instructions: "Sofreír, añadir el arroz y el caldo.".to_owned(),
            cooking_time_minutes: 45,
            difficulty: Difficulty::Intermediate,
            owner_id: UserId::generate(),
            version: 3,
            created_at: now,
            updated_at: now,
        };
        let owner = recipe.owner_id;

        let value = serde_json::to_value(recipe.into_doc(owner)).unwrap();

        assert_eq!(value["titulo"], "Paella");
        assert_eq!(value["tiempoCoccion"], 45);
        assert_eq!(value["dificultad"], "Intermedio");
        assert_eq!(value["usuario"], owner.to_string());
        assert!(value.get("version").is_none());
        assert!(value.get("createdAt").is_some());
    }
}
