//! HTTP routes.
//!
//! [`app`] assembles the complete router (minus the Sentry layers, which
//! `main` adds outermost) so tests drive exactly what production serves.

pub mod extract;
pub mod ingredients;
pub mod recipes;
pub mod search;
pub mod users;


use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::envelope::Failure;
use crate::middleware::{expose_error_detail, request_id_middleware};
use crate::state::AppState;

/// Endpoints listed in the 404 body for unmatched routes.
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /api/users",
    "GET /api/recipes",
    "GET /api/ingredients",
    "GET /api/search",
];

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/{id}/recipes", get(users::recipes))
}

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::list).post(recipes::create))
        .route(
            "/{id}",
            get(recipes::show)
                .put(recipes::update)
                .delete(recipes::destroy),
        )
        .route("/{id}/ingredients", get(recipes::ingredients))
}

/// Create the ingredient routes router.
pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ingredients::list).post(ingredients::create))
        .route("/{id}", delete(ingredients::destroy))
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes-by-ingredient", get(search::recipes_by_ingredient))
        .route("/global", get(search::global))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/users", user_routes())
        .nest("/api/recipes", recipe_routes())
        .nest("/api/ingredients", ingredient_routes())
        .nest("/api/search", search_routes())
        .fallback(not_found)
}

/// Build the application with its middleware stack.
pub fn app(state: AppState) -> Router {
    let mut router = routes();

    if state.environment().is_development() {
        router = router.layer(axum::middleware::map_response(expose_error_detail));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// `GET /`: service metadata.
async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "API de Recetas",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "usuarios": "/api/users",
            "recetas": "/api/recipes",
            "ingredientes": "/api/ingredients",
            "busqueda": "/api/search",
        },
        "documentation": "Consulta el README.md para más información",
    }))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> Response {
    Failure::new("Endpoint no encontrado")
        .with_endpoints(AVAILABLE_ENDPOINTS)
        .into_response_with(StatusCode::NOT_FOUND)
}
