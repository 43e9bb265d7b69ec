//! In-process store backed by vectors behind one `RwLock`.
//!
//! Used by router tests and for running the API without a database. It
//! mirrors the `PostgreSQL` schema's constraints: unique emails, unique
//! ingredient names per recipe, and references that must exist on insert
//! and cannot be left dangling by a delete.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use culinary_core::{Email, IngredientId, RecipeId, UserId};

use super::{Store, StoreError, UniqueConstraint};
use crate::integrity::{CascadePlan, CascadeReport, CascadeStep};
use crate::models::{
    Entity, Ingredient, NewIngredient, NewRecipe, NewUser, Recipe, RecipeChanges, User,
    UserChanges,
};
use crate::query::{IngredientFilter, RecipeFilter, UserFilter};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    recipes: Vec<Recipe>,
    ingredients: Vec<Ingredient>,
}

impl Tables {
    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| &u.email == email && Some(u.id) != except)
    }

    fn apply(&mut self, step: &CascadeStep, report: &mut CascadeReport) -> Result<(), StoreError> {
        match step {
            CascadeStep::IngredientsOfRecipes(recipes) => {
                let before = self.ingredients.len();
                self.ingredients.retain(|i| !recipes.contains(&i.recipe_id));
                report.ingredients += count(before - self.ingredients.len());
            }
            CascadeStep::Recipes(recipes) => {
                if self.ingredients.iter().any(|i| recipes.contains(&i.recipe_id)) {
                    return Err(StoreError::StillReferenced(Entity::Recipe));
                }
                let before = self.recipes.len();
                self.recipes.retain(|r| !recipes.contains(&r.id));
                report.recipes += count(before - self.recipes.len());
            }
            CascadeStep::Users(users) => {
                if self.recipes.iter().any(|r| users.contains(&r.owner_id)) {
                    return Err(StoreError::StillReferenced(Entity::User));
                }
                let before = self.users.len();
                self.users.retain(|u| !users.contains(&u.id));
                report.users += count(before - self.users.len());
            }
        }
        Ok(())
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Newest first; ties keep reverse insertion order.
fn newest_first<T: Clone>(
    rows: &[T],
    keep: impl Fn(&T) -> bool,
    created_at: impl Fn(&T) -> chrono::DateTime<Utc>,
    limit: Option<usize>,
) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().filter(|row| keep(row)).cloned().collect();
    out.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    if let Some(limit) = limit {
        out.truncate(limit);
    }
    out
}

/// A store that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.users,
            |u| filter.matches(u),
            |u| u.created_at,
            filter.limit,
        ))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&new.email, None) {
            return Err(StoreError::Conflict {
                constraint: UniqueConstraint::UserEmail,
                value: new.email.into_inner(),
            });
        }

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            name: new.name,
            email: new.email,
            age: new.age,
            country: new.country,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email
            && tables.email_taken(email, Some(id))
        {
            return Err(StoreError::Conflict {
                constraint: UniqueConstraint::UserEmail,
                value: email.to_string(),
            });
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        changes.apply_to(user);
        user.version += 1;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.recipes,
            |r| filter.matches(r),
            |r| r.created_at,
            filter.limit,
        ))
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_recipe(&self, new: NewRecipe) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == new.owner_id) {
            return Err(StoreError::MissingReference(Entity::User));
        }

        let now = Utc::now();
        let recipe = Recipe {
            id: RecipeId::generate(),
            title: new.title,
            description: new.description,
            instructions: new.instructions,
            cooking_time_minutes: new.cooking_time_minutes,
            difficulty: new.difficulty,
            owner_id: new.owner_id,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        tables.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(recipe) = tables.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        changes.apply_to(recipe);
        recipe.version += 1;
        recipe.updated_at = Utc::now();
        Ok(Some(recipe.clone()))
    }

    async fn list_ingredients(
        &self,
        filter: &IngredientFilter,
    ) -> Result<Vec<Ingredient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            &tables.ingredients,
            |i| filter.matches(i),
            |i| i.created_at,
            filter.limit,
        ))
    }

    async fn insert_ingredient(&self, new: NewIngredient) -> Result<Ingredient, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.recipes.iter().any(|r| r.id == new.recipe_id) {
            return Err(StoreError::MissingReference(Entity::Recipe));
        }
        if tables
            .ingredients
            .iter()
            .any(|i| i.recipe_id == new.recipe_id && i.name == new.name)
        {
            return Err(StoreError::Conflict {
                constraint: UniqueConstraint::IngredientPerRecipe,
                value: new.name,
            });
        }

        let now = Utc::now();
        let ingredient = Ingredient {
            id: IngredientId::generate(),
            name: new.name,
            quantity: new.quantity,
            unit: new.unit,
            recipe_id: new.recipe_id,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        tables.ingredients.push(ingredient.clone());
        Ok(ingredient)
    }

    async fn delete_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(pos) = tables.ingredients.iter().position(|i| i.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.ingredients.remove(pos)))
    }

    async fn execute_cascade(&self, plan: &CascadePlan) -> Result<CascadeReport, StoreError> {
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        let mut report = CascadeReport::default();
        for step in plan.steps() {
            next.apply(step, &mut report)?;
        }
        *tables = next;
        Ok(report)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use culinary_core::{Difficulty, Unit};

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_owned(),
            email: Email::parse(email).unwrap(),
            age: Some(30),
            country: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(new_user("ana@example.com")).await.unwrap();

        let err = store
            .insert_user(new_user("ANA@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Conflict {
                constraint: UniqueConstraint::UserEmail,
                ..
            }
        ));
        assert_eq!(store.list_users(&UserFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_own_email_is_allowed() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("ana@example.com")).await.unwrap();

        let changes = UserChanges {
            email: Some(Email::parse("ana@example.com").unwrap()),
            ..UserChanges::default()
        };
        let updated = store.update_user(user.id, changes).await.unwrap().unwrap();

        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_limited() {
        let store = MemoryStore::new();
        for email in ["u1@example.com", "u2@example.com", "u3@example.com"] {
            store.insert_user(new_user(email)).await.unwrap();
        }

        let users = store
            .list_users(&UserFilter {
                limit: Some(2),
                ..UserFilter::default()
            })
            .await
            .unwrap();

        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["u3@example.com", "u2@example.com"]);
    }

    #[tokio::test]
    async fn test_recipe_requires_existing_owner() {
        let store = MemoryStore::new();
        let err = store
            .insert_recipe(NewRecipe {
                title: "Paella".to_owned(),
                description: "Arroz con marisco".to_owned(),
                instructions: "Sofreír, añadir arroz y caldo.".to_owned(),
                cooking_time_minutes: 40,
                difficulty: Difficulty::Hard,
                owner_id: UserId::generate(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::MissingReference(Entity::User)));
        assert!(store.list_recipes(&RecipeFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_cascade_changes_nothing() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("ana@example.com")).await.unwrap();
        let recipe = store
            .insert_recipe(NewRecipe {
                title: "Paella".to_owned(),
                description: "Arroz con marisco".to_owned(),
                instructions: "Sofreír, añadir arroz y caldo.".to_owned(),
                cooking_time_minutes: 40,
                difficulty: Difficulty::Hard,
                owner_id: user.id,
            })
            .await
            .unwrap();
        store
            .insert_ingredient(NewIngredient {
                name: "arroz".to_owned(),
                quantity: "400".to_owned(),
                unit: Unit::Grams,
                recipe_id: recipe.id,
            })
            .await
            .unwrap();

        // The user's recipe is not in the plan, so the user step must fail.
        let plan = CascadePlan::for_users(vec![user.id], Vec::new());
        let err = store.execute_cascade(&plan).await.unwrap_err();

        assert!(matches!(err, StoreError::StillReferenced(Entity::User)));
        assert!(store.get_user(user.id).await.unwrap().is_some());
        assert_eq!(
            store
                .list_ingredients(&IngredientFilter::default())
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
