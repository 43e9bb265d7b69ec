//! Read filters and result shaping.
//!
//! Filters are plain data built from query parameters; each store backend
//! evaluates them its own way (SQL for `PostgreSQL`, predicates for the
//! memory store). Population and the search fan-outs live here so both
//! backends shape results identically.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use culinary_core::{Difficulty, RecipeId, UserId};

use crate::models::{
    Ingredient, IngredientDoc, OwnerSummary, Recipe, RecipeDoc, RecipeRef, User,
};
use crate::store::{Store, StoreError};

/// Per-category cap on global search results.
pub const SEARCH_LIMIT: usize = 10;

/// Case-insensitive literal substring match.
///
/// The term is matched verbatim: regex and `LIKE` metacharacters have no
/// special meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    needle: String,
}

impl TextMatch {
    /// Build a matcher, or `None` for a blank term.
    #[must_use]
    pub fn new(term: &str) -> Option<Self> {
        let term = term.trim();
        if term.is_empty() {
            None
        } else {
            Some(Self {
                needle: term.to_lowercase(),
            })
        }
    }

    /// Whether `haystack` contains the term, ignoring case.
    #[must_use]
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    /// An `ILIKE` pattern with `%`, `_` and `\` escaped.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.needle.len() + 2);
        pattern.push('%');
        for ch in self.needle.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}

/// Predicates over users. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring over name, email, or country.
    pub text: Option<TextMatch>,
    pub ids: Option<Vec<UserId>>,
    pub limit: Option<usize>,
}

impl UserFilter {
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let text_ok = self.text.as_ref().is_none_or(|text| {
            text.matches(&user.name)
                || text.matches(user.email.as_str())
                || user.country.as_deref().is_some_and(|c| text.matches(c))
        });
        let ids_ok = self.ids.as_ref().is_none_or(|ids| ids.contains(&user.id));
        text_ok && ids_ok
    }
}

/// Predicates over recipes. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Substring over the title only.
    pub title: Option<TextMatch>,
    /// Substring over title, description, or instructions.
    pub text: Option<TextMatch>,
    pub difficulty: Option<Difficulty>,
    pub owner_ids: Option<Vec<UserId>>,
    pub ids: Option<Vec<RecipeId>>,
    pub limit: Option<usize>,
}

impl RecipeFilter {
    /// Recipes owned by one user.
    #[must_use]
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner_ids: Some(vec![owner]),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.title.as_ref().is_none_or(|t| t.matches(&recipe.title))
            && self.text.as_ref().is_none_or(|t| {
                t.matches(&recipe.title)
                    || t.matches(&recipe.description)
                    || t.matches(&recipe.instructions)
            })
            && self.difficulty.is_none_or(|d| d == recipe.difficulty)
            && self
                .owner_ids
                .as_ref()
                .is_none_or(|owners| owners.contains(&recipe.owner_id))
            && self.ids.as_ref().is_none_or(|ids| ids.contains(&recipe.id))
    }
}

/// Predicates over ingredients. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct IngredientFilter {
    pub name: Option<TextMatch>,
    pub recipe_ids: Option<Vec<RecipeId>>,
    pub limit: Option<usize>,
}

impl IngredientFilter {
    /// Ingredients of one recipe.
    #[must_use]
    pub fn of_recipe(recipe: RecipeId) -> Self {
        Self {
            recipe_ids: Some(vec![recipe]),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, ingredient: &Ingredient) -> bool {
        self.name.as_ref().is_none_or(|n| n.matches(&ingredient.name))
            && self
                .recipe_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&ingredient.recipe_id))
    }
}

/// Raw `GET /api/recipes` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeQuery {
    pub titulo: Option<String>,
    pub dificultad: Option<String>,
    pub usuario: Option<String>,
}

// =============================================================================
// Population
// =============================================================================

/// Attach owner summaries to recipes. Missing owners render as `null`.
///
/// # Errors
///
/// Returns `StoreError` if the owner lookup fails.
pub async fn populate_owners(
    store: &dyn Store,
    recipes: Vec<Recipe>,
) -> Result<Vec<RecipeDoc<Option<OwnerSummary>>>, StoreError> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let owner_ids: Vec<UserId> = distinct(recipes.iter().map(|r| r.owner_id));
    let owners: HashMap<UserId, OwnerSummary> = store
        .list_users(&UserFilter {
            ids: Some(owner_ids),
            ..UserFilter::default()
        })
        .await?
        .iter()
        .map(|user| (user.id, OwnerSummary::from(user)))
        .collect();

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let owner = owners.get(&recipe.owner_id).cloned();
            recipe.into_doc(owner)
        })
        .collect())
}

/// Populate a single recipe's owner.
///
/// # Errors
///
/// Returns `StoreError` if the owner lookup fails.
pub async fn populate_owner(
    store: &dyn Store,
    recipe: Recipe,
) -> Result<RecipeDoc<Option<OwnerSummary>>, StoreError> {
    let owner = store
        .get_user(recipe.owner_id)
        .await?
        .as_ref()
        .map(OwnerSummary::from);
    Ok(recipe.into_doc(owner))
}

/// Attach a recipe summary (shaped by `F`) to each ingredient.
///
/// # Errors
///
/// Returns `StoreError` if the recipe lookup fails.
pub async fn populate_recipes<F>(
    store: &dyn Store,
    ingredients: Vec<Ingredient>,
) -> Result<Vec<IngredientDoc<Option<F>>>, StoreError>
where
    F: for<'a> From<&'a Recipe> + Clone,
{
    if ingredients.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<RecipeId> = distinct(ingredients.iter().map(|i| i.recipe_id));
    let recipes: HashMap<RecipeId, F> = store
        .list_recipes(&RecipeFilter {
            ids: Some(recipe_ids),
            ..RecipeFilter::default()
        })
        .await?
        .iter()
        .map(|recipe| (recipe.id, F::from(recipe)))
        .collect();

    Ok(ingredients
        .into_iter()
        .map(|ingredient| {
            let recipe = recipes.get(&ingredient.recipe_id).cloned();
            ingredient.into_doc(recipe)
        })
        .collect())
}

/// Populate a single ingredient's recipe as `{_id, titulo}`.
///
/// # Errors
///
/// Returns `StoreError` if the recipe lookup fails.
pub async fn populate_recipe(
    store: &dyn Store,
    ingredient: Ingredient,
) -> Result<IngredientDoc<Option<RecipeRef>>, StoreError> {
    let recipe = store
        .get_recipe(ingredient.recipe_id)
        .await?
        .as_ref()
        .map(RecipeRef::from);
    Ok(ingredient.into_doc(recipe))
}

fn distinct<T: Copy + Eq + std::hash::Hash>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}

// =============================================================================
// Search
// =============================================================================

/// Recipes having at least one ingredient whose name contains `term`.
///
/// Each recipe appears once, however many of its ingredients match.
///
/// # Errors
///
/// Returns `StoreError` if either lookup fails.
pub async fn recipes_by_ingredient(
    store: &dyn Store,
    term: &TextMatch,
) -> Result<Vec<RecipeDoc<Option<OwnerSummary>>>, StoreError> {
    let ingredients = store
        .list_ingredients(&IngredientFilter {
            name: Some(term.clone()),
            ..IngredientFilter::default()
        })
        .await?;

    let recipe_ids = distinct(ingredients.iter().map(|i| i.recipe_id));
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }

    let recipes = store
        .list_recipes(&RecipeFilter {
            ids: Some(recipe_ids),
            ..RecipeFilter::default()
        })
        .await?;
    populate_owners(store, recipes).await
}

/// Results of a global search, one list per category.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    #[serde(rename = "usuarios")]
    pub users: Vec<User>,
    #[serde(rename = "recetas")]
    pub recipes: Vec<RecipeDoc<Option<OwnerSummary>>>,
    #[serde(rename = "ingredientes")]
    pub ingredients: Vec<IngredientDoc<Option<RecipeRef>>>,
}

impl SearchResults {
    #[must_use]
    pub fn counts(&self) -> SearchCounts {
        SearchCounts {
            users: self.users.len(),
            recipes: self.recipes.len(),
            ingredients: self.ingredients.len(),
        }
    }
}

/// Per-category result counts of a global search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchCounts {
    #[serde(rename = "usuarios")]
    pub users: usize,
    #[serde(rename = "recetas")]
    pub recipes: usize,
    #[serde(rename = "ingredientes")]
    pub ingredients: usize,
}

/// Search users, recipes and ingredients for `term`, [`SEARCH_LIMIT`] each.
///
/// # Errors
///
/// Returns `StoreError` if any category lookup fails.
pub async fn global_search(store: &dyn Store, term: &TextMatch) -> Result<SearchResults, StoreError> {
    let limit = Some(SEARCH_LIMIT);

    let user_filter = UserFilter {
        text: Some(term.clone()),
        limit,
        ..UserFilter::default()
    };
    let recipe_filter = RecipeFilter {
        text: Some(term.clone()),
        limit,
        ..RecipeFilter::default()
    };
    let ingredient_filter = IngredientFilter {
        name: Some(term.clone()),
        limit,
        ..IngredientFilter::default()
    };

    let (users, recipes, ingredients) = tokio::try_join!(
        store.list_users(&user_filter),
        store.list_recipes(&recipe_filter),
        store.list_ingredients(&ingredient_filter),
    )?;

    Ok(SearchResults {
        users,
        recipes: populate_owners(store, recipes).await?,
        ingredients: populate_recipes::<RecipeRef>(store, ingredients).await?,
    })
}
