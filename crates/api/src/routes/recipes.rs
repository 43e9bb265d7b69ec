//! Recipe route handlers.

use axum::extract::{Path, State};
use serde_json::Value;

use culinary_core::validation::{FieldViolation, Mode, RECIPE};
use culinary_core::{Difficulty, RecipeId, UserId};

use super::extract::{ApiQuery, Payload};
use crate::envelope::{Created, Envelope};
use crate::error::{AppError, Result};
use crate::integrity;
use crate::models::{
    Entity, IngredientDoc, NewRecipe, OwnerSummary, RecipeChanges, RecipeDetail, RecipeDoc,
    RecipeRef,
};
use crate::query::{self, IngredientFilter, RecipeFilter, RecipeQuery, TextMatch};
use crate::state::AppState;

type PopulatedRecipe = RecipeDoc<Option<OwnerSummary>>;

/// Build a recipe filter from `titulo`, `dificultad` and `usuario`.
///
/// Blank parameters are ignored.
///
/// # Errors
///
/// An unknown difficulty is a validation error; a malformed owner id is
/// `AppError::MalformedId`.
pub fn recipe_filter(params: RecipeQuery) -> Result<RecipeFilter> {
    let mut filter = RecipeFilter {
        title: params.titulo.as_deref().and_then(TextMatch::new),
        ..RecipeFilter::default()
    };

    if let Some(raw) = params.dificultad.filter(|d| !d.trim().is_empty()) {
        let difficulty = raw.trim().parse::<Difficulty>().map_err(|_| {
            AppError::Validation(vec![FieldViolation::new(
                "dificultad",
                "La dificultad debe ser: Fácil, Intermedio o Difícil",
                Value::String(raw.clone()),
            )])
        })?;
        filter.difficulty = Some(difficulty);
    }

    if let Some(raw) = params.usuario.filter(|u| !u.trim().is_empty()) {
        filter.owner_ids = Some(vec![UserId::parse(&raw)?]);
    }

    Ok(filter)
}

/// `GET /api/recipes?titulo=&dificultad=&usuario=`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RecipeQuery>,
) -> Result<Envelope<Vec<PopulatedRecipe>>> {
    let filter = recipe_filter(params)?;
    let store = state.store();
    let recipes = store.list_recipes(&filter).await?;
    let docs = query::populate_owners(store, recipes).await?;
    Ok(Envelope::list("Recetas obtenidas exitosamente", docs))
}

/// `GET /api/recipes/{id}`: the recipe with its ingredients inlined.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<RecipeDetail>> {
    let id = RecipeId::parse(&id)?;
    let store = state.store();
    let recipe = store
        .get_recipe(id)
        .await?
        .ok_or(AppError::NotFound(Entity::Recipe))?;

    let ingredients = store
        .list_ingredients(&IngredientFilter::of_recipe(id))
        .await?
        .into_iter()
        .map(|ingredient| ingredient.into_doc(id))
        .collect();

    let detail = RecipeDetail {
        recipe: query::populate_owner(store, recipe).await?,
        ingredients,
    };
    Ok(Envelope::new("Receta obtenida exitosamente", detail))
}

/// `POST /api/recipes`: the owner must exist.
pub async fn create(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Created<PopulatedRecipe>> {
    let new: NewRecipe = payload.validate(&RECIPE, Mode::Create)?;
    let store = state.store();
    if !integrity::check_owner_exists(store, new.owner_id).await? {
        return Err(AppError::NotFound(Entity::User));
    }

    let recipe = store.insert_recipe(new).await?;
    tracing::info!(recipe_id = %recipe.id, owner_id = %recipe.owner_id, "Recipe created");

    let doc = query::populate_owner(store, recipe).await?;
    Ok(Created(Envelope::new("Receta creada exitosamente", doc)))
}

/// `PUT /api/recipes/{id}`: the owner cannot be changed.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Payload,
) -> Result<Envelope<PopulatedRecipe>> {
    let id = RecipeId::parse(&id)?;
    let changes: RecipeChanges = payload.validate(&RECIPE, Mode::Update)?;
    let store = state.store();
    let recipe = store
        .update_recipe(id, changes)
        .await?
        .ok_or(AppError::NotFound(Entity::Recipe))?;

    let doc = query::populate_owner(store, recipe).await?;
    Ok(Envelope::new("Receta actualizada exitosamente", doc))
}

/// `DELETE /api/recipes/{id}`: also removes the recipe's ingredients.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<RecipeDoc<UserId>>> {
    let id = RecipeId::parse(&id)?;
    let (recipe, _report) = integrity::cascade_delete_recipe(state.store(), id).await?;
    let owner = recipe.owner_id;
    Ok(Envelope::new(
        "Receta eliminada exitosamente",
        recipe.into_doc(owner),
    ))
}

/// `GET /api/recipes/{id}/ingredients`
pub async fn ingredients(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<Vec<IngredientDoc<Option<RecipeRef>>>>> {
    let id = RecipeId::parse(&id)?;
    let store = state.store();
    if !integrity::check_recipe_exists(store, id).await? {
        return Err(AppError::NotFound(Entity::Recipe));
    }

    let ingredients = store
        .list_ingredients(&IngredientFilter::of_recipe(id))
        .await?;
    let docs = query::populate_recipes::<RecipeRef>(store, ingredients).await?;
    Ok(Envelope::list("Ingredientes obtenidos exitosamente", docs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn params(titulo: Option<&str>, dificultad: Option<&str>, usuario: Option<&str>) -> RecipeQuery {
        RecipeQuery {
            titulo: titulo.map(str::to_owned),
            dificultad: dificultad.map(str::to_owned),
            usuario: usuario.map(str::to_owned),
        }
    }

    #[test]
    fn test_filter_normalizes_difficulty_alias() {
        let filter = recipe_filter(params(None, Some("Facil"), None)).unwrap();
        assert_eq!(filter.difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn test_filter_ignores_blank_params() {
        let filter = recipe_filter(params(Some(" "), Some(""), Some(""))).unwrap();
        assert!(filter.title.is_none());
        assert!(filter.difficulty.is_none());
        assert!(filter.owner_ids.is_none());
    }

    #[test]
    fn test_filter_rejects_unknown_difficulty() {
        let err = recipe_filter(params(None, Some("Extremo"), None)).unwrap_err();
        assert!(matches!(err, AppError::Validation(v) if v[0].field == "dificultad"));
    }

    #[test]
    fn test_filter_rejects_malformed_owner() {
        let err = recipe_filter(params(None, None, Some("abc"))).unwrap_err();
        assert!(matches!(err, AppError::MalformedId(_)));
    }
}
