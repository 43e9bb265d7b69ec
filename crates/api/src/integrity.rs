//! Referential integrity across users, recipes and ingredients.
//!
//! References are checked once, when a recipe or ingredient is created.
//! Deletes never rely on store triggers: the dependents of an entity are
//! resolved up front into a [`CascadePlan`], which the store runs as a
//! single unit (one transaction in `PostgreSQL`, one write lock in memory).
//!
//! Deletion order is always ingredients, then recipes, then users, so no
//! step ever leaves a dangling reference behind.

use serde::Serialize;

use culinary_core::{IngredientId, RecipeId, UserId};

use crate::models::{Entity, Ingredient, Recipe, User};
use crate::query::{RecipeFilter, UserFilter};
use crate::store::{Store, StoreError};

/// One bulk delete in a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeStep {
    /// Delete every ingredient belonging to these recipes.
    IngredientsOfRecipes(Vec<RecipeId>),
    /// Delete these recipes.
    Recipes(Vec<RecipeId>),
    /// Delete these users.
    Users(Vec<UserId>),
}

/// An ordered list of deletes, executed atomically by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadePlan {
    steps: Vec<CascadeStep>,
}

impl CascadePlan {
    /// Delete recipes along with their ingredients.
    #[must_use]
    pub fn for_recipes(recipes: Vec<RecipeId>) -> Self {
        Self {
            steps: vec![
                CascadeStep::IngredientsOfRecipes(recipes.clone()),
                CascadeStep::Recipes(recipes),
            ],
        }
    }

    /// Delete users along with their recipes (already resolved) and the
    /// ingredients of those recipes.
    #[must_use]
    pub fn for_users(users: Vec<UserId>, recipes: Vec<RecipeId>) -> Self {
        let mut plan = Self::for_recipes(recipes);
        plan.steps.push(CascadeStep::Users(users));
        plan
    }

    #[must_use]
    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }
}

/// Rows removed by a cascade, per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    #[serde(rename = "usuarios")]
    pub users: u64,
    #[serde(rename = "recetas")]
    pub recipes: u64,
    #[serde(rename = "ingredientes")]
    pub ingredients: u64,
}

/// Errors from integrity-checked operations.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("recipe {0} not found")]
    RecipeNotFound(RecipeId),

    #[error("ingredient {0} not found")]
    IngredientNotFound(IngredientId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntegrityError {
    /// The entity kind that was missing, if this is a not-found outcome.
    #[must_use]
    pub const fn missing_entity(&self) -> Option<Entity> {
        match self {
            Self::UserNotFound(_) => Some(Entity::User),
            Self::RecipeNotFound(_) => Some(Entity::Recipe),
            Self::IngredientNotFound(_) => Some(Entity::Ingredient),
            Self::Store(_) => None,
        }
    }
}

/// Whether a user exists, for checking a recipe's owner before insert.
///
/// # Errors
///
/// Returns `StoreError` if the lookup fails.
pub async fn check_owner_exists(store: &dyn Store, id: UserId) -> Result<bool, StoreError> {
    Ok(store.get_user(id).await?.is_some())
}

/// Whether a recipe exists, for checking an ingredient's recipe before insert.
///
/// # Errors
///
/// Returns `StoreError` if the lookup fails.
pub async fn check_recipe_exists(store: &dyn Store, id: RecipeId) -> Result<bool, StoreError> {
    Ok(store.get_recipe(id).await?.is_some())
}

/// Delete a user, its recipes, and their ingredients.
///
/// Returns the deleted user and how many rows went with it.
///
/// # Errors
///
/// Returns `IntegrityError::UserNotFound` (touching nothing) if the user does
/// not exist, or `IntegrityError::Store` if the cascade fails; a failed
/// cascade deletes nothing.
pub async fn cascade_delete_user(
    store: &dyn Store,
    id: UserId,
) -> Result<(User, CascadeReport), IntegrityError> {
    let user = store
        .get_user(id)
        .await?
        .ok_or(IntegrityError::UserNotFound(id))?;

    let recipes = owned_recipe_ids(store, vec![id]).await?;
    let plan = CascadePlan::for_users(vec![id], recipes);
    let report = store.execute_cascade(&plan).await?;

    tracing::info!(
        user_id = %id,
        recipes = report.recipes,
        ingredients = report.ingredients,
        "Deleted user with dependents"
    );
    Ok((user, report))
}

/// Delete a recipe and its ingredients.
///
/// # Errors
///
/// Returns `IntegrityError::RecipeNotFound` if the recipe does not exist, or
/// `IntegrityError::Store` if the cascade fails.
pub async fn cascade_delete_recipe(
    store: &dyn Store,
    id: RecipeId,
) -> Result<(Recipe, CascadeReport), IntegrityError> {
    let recipe = store
        .get_recipe(id)
        .await?
        .ok_or(IntegrityError::RecipeNotFound(id))?;

    let report = store
        .execute_cascade(&CascadePlan::for_recipes(vec![id]))
        .await?;

    tracing::info!(
        recipe_id = %id,
        ingredients = report.ingredients,
        "Deleted recipe with dependents"
    );
    Ok((recipe, report))
}

/// Delete every user matching `filter`, with their dependents.
///
/// The matching set is resolved before anything is deleted.
///
/// # Errors
///
/// Returns `StoreError` if resolution or the cascade fails.
pub async fn cascade_delete_many_users(
    store: &dyn Store,
    filter: &UserFilter,
) -> Result<CascadeReport, StoreError> {
    let users: Vec<UserId> = store
        .list_users(filter)
        .await?
        .into_iter()
        .map(|user| user.id)
        .collect();

    if users.is_empty() {
        return Ok(CascadeReport::default());
    }

    let recipes = owned_recipe_ids(store, users.clone()).await?;
    let report = store
        .execute_cascade(&CascadePlan::for_users(users, recipes))
        .await?;

    tracing::info!(
        users = report.users,
        recipes = report.recipes,
        ingredients = report.ingredients,
        "Deleted users with dependents"
    );
    Ok(report)
}

/// Delete a single ingredient.
///
/// # Errors
///
/// Returns `IntegrityError::IngredientNotFound` if it does not exist.
pub async fn delete_ingredient(
    store: &dyn Store,
    id: IngredientId,
) -> Result<Ingredient, IntegrityError> {
    store
        .delete_ingredient(id)
        .await?
        .ok_or(IntegrityError::IngredientNotFound(id))
}

async fn owned_recipe_ids(
    store: &dyn Store,
    owners: Vec<UserId>,
) -> Result<Vec<RecipeId>, StoreError> {
    Ok(store
        .list_recipes(&RecipeFilter {
            owner_ids: Some(owners),
            ..RecipeFilter::default()
        })
        .await?
        .into_iter()
        .map(|recipe| recipe.id)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use culinary_core::{Difficulty, Email, Unit};

    use super::*;
    use crate::models::{NewIngredient, NewRecipe, NewUser};
    use crate::query::IngredientFilter;
    use crate::store::MemoryStore;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Cocinera".to_owned(),
            email: Email::parse(email).unwrap(),
            age: None,
            country: None,
        }
    }

    fn new_recipe(owner: UserId, title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_owned(),
            description: "Una receta de prueba".to_owned(),
            instructions: "Mezclar todo y cocinar a fuego lento.".to_owned(),
            cooking_time_minutes: 20,
            difficulty: Difficulty::Easy,
            owner_id: owner,
        }
    }

    fn new_ingredient(recipe: RecipeId, name: &str) -> NewIngredient {
        NewIngredient {
            name: name.to_owned(),
            quantity: "1".to_owned(),
            unit: Unit::Pieces,
            recipe_id: recipe,
        }
    }

    #[test]
    fn test_user_plan_orders_ingredients_recipes_users() {
        let user = UserId::generate();
        let recipe = RecipeId::generate();
        let plan = CascadePlan::for_users(vec![user], vec![recipe]);

        assert_eq!(
            plan.steps(),
            [
                CascadeStep::IngredientsOfRecipes(vec![recipe]),
                CascadeStep::Recipes(vec![recipe]),
                CascadeStep::Users(vec![user]),
            ]
        );
    }

    #[tokio::test]
    async fn test_cascade_delete_user_removes_all_descendants() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("chef@example.com")).await.unwrap();
        let other = store.insert_user(new_user("otro@example.com")).await.unwrap();

        for title in ["Paella", "Gazpacho"] {
            let recipe = store.insert_recipe(new_recipe(user.id, title)).await.unwrap();
            for name in ["ajo", "cebolla", "tomate"] {
                store
                    .insert_ingredient(new_ingredient(recipe.id, name))
                    .await
                    .unwrap();
            }
        }
        let kept = store.insert_recipe(new_recipe(other.id, "Tortilla")).await.unwrap();
        store
            .insert_ingredient(new_ingredient(kept.id, "huevo"))
            .await
            .unwrap();

        let (deleted, report) = cascade_delete_user(&store, user.id).await.unwrap();

        assert_eq!(deleted.id, user.id);
        assert_eq!(
            report,
            CascadeReport {
                users: 1,
                recipes: 2,
                ingredients: 6,
            }
        );
        let remaining = store
            .list_ingredients(&IngredientFilter::default())
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(store.get_recipe(kept.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cascade_delete_missing_user_is_not_found() {
        let store = MemoryStore::new();
        let err = cascade_delete_user(&store, UserId::generate())
            .await
            .unwrap_err();
        assert_eq!(err.missing_entity(), Some(Entity::User));
    }

    #[tokio::test]
    async fn test_cascade_delete_recipe_keeps_owner() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("chef@example.com")).await.unwrap();
        let recipe = store.insert_recipe(new_recipe(user.id, "Paella")).await.unwrap();
        store
            .insert_ingredient(new_ingredient(recipe.id, "arroz"))
            .await
            .unwrap();

        let (_, report) = cascade_delete_recipe(&store, recipe.id).await.unwrap();

        assert_eq!(report.ingredients, 1);
        assert_eq!(report.users, 0);
        assert!(store.get_user(user.id).await.unwrap().is_some());
        assert!(!check_recipe_exists(&store, recipe.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_cascade_delete_many_users_clears_everything() {
        let store = MemoryStore::new();
        for email in ["a1@example.com", "a2@example.com", "a3@example.com"] {
            let user = store.insert_user(new_user(email)).await.unwrap();
            store.insert_recipe(new_recipe(user.id, "Receta")).await.unwrap();
        }

        let report = cascade_delete_many_users(&store, &UserFilter::default())
            .await
            .unwrap();

        assert_eq!(report.users, 3);
        assert_eq!(report.recipes, 3);
        assert!(
            store
                .list_users(&UserFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_missing_ingredient_is_not_found() {
        let store = MemoryStore::new();
        let err = delete_ingredient(&store, IngredientId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrityError::IngredientNotFound(_)));
    }
}
