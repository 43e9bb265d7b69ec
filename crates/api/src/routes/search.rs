//! Search route handlers.

use axum::extract::State;
use serde::Deserialize;

use super::extract::ApiQuery;
use crate::envelope::Envelope;
use crate::error::{AppError, Result};
use crate::models::{OwnerSummary, RecipeDoc};
use crate::query::{self, SearchCounts, SearchResults, TextMatch};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngredientSearch {
    pub ingrediente: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GlobalSearch {
    pub q: Option<String>,
}

/// `GET /api/search/recipes-by-ingredient?ingrediente=`
pub async fn recipes_by_ingredient(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<IngredientSearch>,
) -> Result<Envelope<Vec<RecipeDoc<Option<OwnerSummary>>>>> {
    let raw = params.ingrediente.unwrap_or_default();
    let term = TextMatch::new(&raw).ok_or(AppError::MissingParameter("ingrediente"))?;

    let recipes = query::recipes_by_ingredient(state.store(), &term).await?;
    Ok(Envelope::list(
        format!("Recetas encontradas con ingrediente: {}", raw.trim()),
        recipes,
    ))
}

/// `GET /api/search/global?q=`
pub async fn global(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<GlobalSearch>,
) -> Result<Envelope<SearchResults, SearchCounts>> {
    let raw = params.q.unwrap_or_default();
    let term = TextMatch::new(&raw).ok_or(AppError::MissingParameter("q"))?;

    let results = query::global_search(state.store(), &term).await?;
    let counts = results.counts();
    Ok(Envelope::with_total(
        format!("Resultados de búsqueda para: {}", raw.trim()),
        results,
        counts,
    ))
}
