//! Request extractors that answer in the API's error envelope.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use culinary_core::validation::{Mode, Schema};

use crate::error::AppError;

/// A JSON object body, not yet validated.
#[derive(Debug, Clone)]
pub struct Payload(pub Map<String, Value>);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::InvalidBody(rejection.body_text()))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AppError::InvalidBody(
                "El cuerpo debe ser un objeto JSON".to_owned(),
            )),
        }
    }
}

impl Payload {
    /// Validate against `schema` and decode the normalized payload as `T`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` with every violation, or
    /// `AppError::InvalidBody` if the normalized payload does not decode.
    pub fn validate<T: DeserializeOwned>(&self, schema: &Schema, mode: Mode) -> Result<T, AppError> {
        let normalized = schema.validate(&self.0, mode).map_err(|violations| {
            tracing::debug!(entity = schema.entity, count = violations.len(), "Rejected payload");
            AppError::Validation(violations)
        })?;

        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| AppError::InvalidBody(e.to_string()))
    }
}

/// Query parameters; malformed query strings answer with a 400 envelope.
#[derive(Debug, Clone, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| AppError::InvalidBody(rejection.body_text()))?;
        Ok(Self(value))
    }
}
