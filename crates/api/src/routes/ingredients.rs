//! Ingredient route handlers.

use axum::extract::{Path, State};

use culinary_core::validation::{INGREDIENT, Mode};
use culinary_core::{IngredientId, RecipeId};

use super::extract::Payload;
use crate::envelope::{Created, Envelope};
use crate::error::{AppError, Result};
use crate::integrity;
use crate::models::{
    Entity, IngredientDoc, NewIngredient, RecipeRef, RecipeWithOwnerRef,
};
use crate::query::{self, IngredientFilter};
use crate::state::AppState;

/// `GET /api/ingredients`
pub async fn list(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<IngredientDoc<Option<RecipeWithOwnerRef>>>>> {
    let store = state.store();
    let ingredients = store
        .list_ingredients(&IngredientFilter::default())
        .await?;
    let docs = query::populate_recipes::<RecipeWithOwnerRef>(store, ingredients).await?;
    Ok(Envelope::list("Ingredientes obtenidos exitosamente", docs))
}

/// `POST /api/ingredients`: the recipe must exist.
pub async fn create(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Created<IngredientDoc<Option<RecipeRef>>>> {
    let new: NewIngredient = payload.validate(&INGREDIENT, Mode::Create)?;
    let store = state.store();
    if !integrity::check_recipe_exists(store, new.recipe_id).await? {
        return Err(AppError::NotFound(Entity::Recipe));
    }

    let ingredient = store.insert_ingredient(new).await?;
    tracing::info!(
        ingredient_id = %ingredient.id,
        recipe_id = %ingredient.recipe_id,
        "Ingredient added"
    );

    let doc = query::populate_recipe(store, ingredient).await?;
    Ok(Created(Envelope::new("Ingrediente agregado exitosamente", doc)))
}

/// `DELETE /api/ingredients/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<IngredientDoc<RecipeId>>> {
    let id = IngredientId::parse(&id)?;
    let ingredient = integrity::delete_ingredient(state.store(), id).await?;
    let recipe = ingredient.recipe_id;
    Ok(Envelope::new(
        "Ingrediente eliminado exitosamente",
        ingredient.into_doc(recipe),
    ))
}
