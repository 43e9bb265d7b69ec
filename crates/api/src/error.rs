//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use culinary_core::validation::FieldViolation;

use crate::envelope::Failure;
use crate::integrity::IntegrityError;
use crate::models::Entity;
use crate::store::{StoreError, UniqueConstraint};

/// Message for 500 responses.
pub const INTERNAL_MESSAGE: &str = "Error interno del servidor";

/// Detail shown in place of the real cause of a 500 response.
pub const ELIDED_DETAIL: &str = "Algo salió mal";

/// The real cause of a 500 response, attached as a response extension.
///
/// Only the development-mode middleware reads it; otherwise it never leaves
/// the process.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Payload failed validation.
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// A required query parameter is absent or blank.
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Target entity, or a referenced parent, does not exist.
    #[error("Not found: {0}")]
    NotFound(Entity),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict on {constraint}: {value}")]
    Conflict {
        constraint: UniqueConstraint,
        value: String,
    },

    /// An identifier is not in the store's format.
    #[error("Malformed id: {0}")]
    MalformedId(String),

    /// The request body could not be read as JSON.
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { constraint, value } => Self::Conflict { constraint, value },
            StoreError::MissingReference(entity) => Self::NotFound(entity),
            other => Self::Store(other),
        }
    }
}

impl From<IntegrityError> for AppError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::UserNotFound(_) => Self::NotFound(Entity::User),
            IntegrityError::RecipeNotFound(_) => Self::NotFound(Entity::Recipe),
            IntegrityError::IngredientNotFound(_) => Self::NotFound(Entity::Ingredient),
            IntegrityError::Store(store) => store.into(),
        }
    }
}

impl From<culinary_core::IdError> for AppError {
    fn from(err: culinary_core::IdError) -> Self {
        Self::MalformedId(err.value)
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::MissingParameter(_)
            | Self::Conflict { .. }
            | Self::MalformedId(_)
            | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::Validation(violations) => {
                Failure::new("Errores de validación").with_errors(violations)
            }
            Self::MissingParameter(name) => {
                Failure::new(format!("El parámetro \"{name}\" es obligatorio"))
            }
            Self::NotFound(entity) => Failure::new(entity.not_found_message()),
            Self::Conflict { constraint, value } => Failure::new(constraint.message())
                .with_error(format!("Valor duplicado: {value}")),
            Self::MalformedId(value) => {
                Failure::new("ID inválido").with_error(format!("Identificador inválido: {value}"))
            }
            Self::InvalidBody(reason) => {
                Failure::new("Cuerpo de la solicitud inválido").with_error(reason)
            }
            Self::Store(ref err) => {
                let event_id = sentry::capture_error(err);
                tracing::error!(
                    error = %err,
                    sentry_event_id = %event_id,
                    "Request error"
                );

                // Don't expose internal error details to clients
                let detail = InternalErrorDetail(err.to_string());
                let mut response = Failure::new(INTERNAL_MESSAGE)
                    .with_error(ELIDED_DETAIL)
                    .into_response_with(status);
                response.extensions_mut().insert(detail);
                return response;
            }
        };

        body.into_response_with(status)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
