//! Sample dataset loading.
//!
//! The dataset is YAML: a list of users and a list of recipes, each recipe
//! naming its owner by email and carrying its ingredients inline. Every
//! entity goes through the same validation schema as an API request.

use std::collections::HashMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use culinary_core::validation::{FieldViolation, INGREDIENT, Mode, RECIPE, Schema, USER};
use culinary_core::{Email, UserId};

use crate::integrity::{self, CascadeReport};
use crate::models::{NewIngredient, NewRecipe, NewUser};
use crate::query::UserFilter;
use crate::store::{Store, StoreError};

/// The dataset bundled with the crate.
pub const EMBEDDED_DATASET: &str = include_str!("../data/dataset.yaml");

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid dataset YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid {entity} in dataset: {}", summarize(.violations))]
    Invalid {
        entity: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("could not decode {entity}: {source}")]
    Decode {
        entity: &'static str,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A recipe entry, owner referenced by email.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecipe {
    #[serde(rename = "userEmail")]
    pub owner_email: String,
    #[serde(rename = "ingredientes", default)]
    pub ingredients: Vec<Map<String, Value>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A parsed dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<Map<String, Value>>,
    #[serde(default)]
    pub recipes: Vec<SeedRecipe>,
}

impl Dataset {
    /// Parse a dataset from YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the document is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The dataset bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the bundled file is malformed.
    pub fn embedded() -> Result<Self, SeedError> {
        Self::from_yaml(EMBEDDED_DATASET)
    }
}

/// Counts of what a seed run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Rows removed before loading.
    pub cleared: CascadeReport,
    pub users: usize,
    pub recipes: usize,
    pub ingredients: usize,
    /// Recipes whose owner email matched no user.
    pub skipped_recipes: usize,
}

/// Load `dataset` into `store`, first deleting everything unless `keep`.
///
/// # Errors
///
/// Returns `SeedError` on the first invalid entity or store failure. Rows
/// written before the failure stay in place.
pub async fn seed(store: &dyn Store, dataset: &Dataset, keep: bool) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    if !keep {
        report.cleared = integrity::cascade_delete_many_users(store, &UserFilter::default()).await?;
    }

    let mut owners: HashMap<Email, UserId> = HashMap::new();
    for fields in &dataset.users {
        let new: NewUser = decode(&USER, fields)?;
        let user = store.insert_user(new).await?;
        owners.insert(user.email.clone(), user.id);
        report.users += 1;
    }

    for entry in &dataset.recipes {
        let owner = Email::parse(&entry.owner_email)
            .ok()
            .and_then(|email| owners.get(&email).copied());
        let Some(owner) = owner else {
            tracing::warn!(email = %entry.owner_email, "Skipping recipe with unknown owner");
            report.skipped_recipes += 1;
            continue;
        };

        let mut fields = entry.fields.clone();
        fields.insert("usuario".to_owned(), Value::String(owner.to_string()));
        let new: NewRecipe = decode(&RECIPE, &fields)?;
        let recipe = store.insert_recipe(new).await?;
        report.recipes += 1;

        for ingredient in &entry.ingredients {
            let mut fields = ingredient.clone();
            fields.insert("receta".to_owned(), Value::String(recipe.id.to_string()));
            let new: NewIngredient = decode(&INGREDIENT, &fields)?;
            store.insert_ingredient(new).await?;
            report.ingredients += 1;
        }

        tracing::debug!(
            title = %recipe.title,
            ingredients = entry.ingredients.len(),
            "Seeded recipe"
        );
    }

    tracing::info!(
        users = report.users,
        recipes = report.recipes,
        ingredients = report.ingredients,
        "Dataset loaded"
    );
    Ok(report)
}

fn decode<T: DeserializeOwned>(schema: &Schema, fields: &Map<String, Value>) -> Result<T, SeedError> {
    let normalized = schema
        .validate(fields, Mode::Create)
        .map_err(|violations| SeedError::Invalid {
            entity: schema.entity,
            violations,
        })?;
    serde_json::from_value(Value::Object(normalized)).map_err(|source| SeedError::Decode {
        entity: schema.entity,
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::query::{IngredientFilter, RecipeFilter};
    use crate::store::MemoryStore;

    #[test]
    fn test_embedded_dataset_parses() {
        let dataset = Dataset::embedded().unwrap();
        assert_eq!(dataset.users.len(), 4);
        assert_eq!(dataset.recipes.len(), 4);
        assert_eq!(dataset.recipes[0].ingredients.len(), 5);
    }

    #[tokio::test]
    async fn test_seed_loads_everything() {
        let store = MemoryStore::new();
        let report = seed(&store, &Dataset::embedded().unwrap(), false)
            .await
            .unwrap();

        assert_eq!(report.users, 4);
        assert_eq!(report.recipes, 4);
        assert_eq!(report.ingredients, 18);
        assert_eq!(report.skipped_recipes, 0);
        assert_eq!(
            store
                .list_ingredients(&IngredientFilter::default())
                .await
                .unwrap()
                .len(),
            18
        );
    }

    #[tokio::test]
    async fn test_reseeding_replaces_previous_data() {
        let store = MemoryStore::new();
        let dataset = Dataset::embedded().unwrap();
        seed(&store, &dataset, false).await.unwrap();

        let report = seed(&store, &dataset, false).await.unwrap();

        assert_eq!(report.cleared.users, 4);
        assert_eq!(report.cleared.ingredients, 18);
        assert_eq!(
            store.list_recipes(&RecipeFilter::default()).await.unwrap().len(),
            4
        );
    }

    #[tokio::test]
    async fn test_seed_with_keep_conflicts_on_existing_users() {
        let store = MemoryStore::new();
        let dataset = Dataset::embedded().unwrap();
        seed(&store, &dataset, false).await.unwrap();

        let err = seed(&store, &dataset, true).await.unwrap_err();

        assert!(matches!(err, SeedError::Store(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_unknown_owner_is_skipped() {
        let yaml = r"
users: []
recipes:
  - titulo: Huérfana
    descripcion: Receta sin dueño conocido
    instrucciones: Esta receta no debería cargarse nunca.
    tiempoCoccion: 10
    userEmail: nadie@example.com
";
        let store = MemoryStore::new();
        let report = seed(&store, &Dataset::from_yaml(yaml).unwrap(), false)
            .await
            .unwrap();
        assert_eq!(report.skipped_recipes, 1);
        assert_eq!(report.recipes, 0);
    }

    #[tokio::test]
    async fn test_invalid_user_is_reported() {
        let yaml = "users:\n  - nombre: A\n    email: not-an-email\n";
        let store = MemoryStore::new();
        let err = seed(&store, &Dataset::from_yaml(yaml).unwrap(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Invalid { entity: "user", .. }));
    }
}
