//! Uniform JSON response bodies.
//!
//! Success: `{ "success": true, "message", "data", "total"? }`.
//! Failure: `{ "success": false, "message", "errors"?, "error"? }`.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use culinary_core::validation::FieldViolation;

/// A successful response. `N` is the shape of `total` (a count, or a
/// per-category count map for global search).
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T, N = usize> {
    success: bool,
    message: Cow<'static, str>,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<N>,
}

impl<T> Envelope<T> {
    /// A single-entity response.
    pub fn new(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            total: None,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// A list response whose `total` is the list length.
    pub fn list(message: impl Into<Cow<'static, str>>, data: Vec<T>) -> Self {
        let total = data.len();
        Self {
            success: true,
            message: message.into(),
            data,
            total: Some(total),
        }
    }
}

impl<T, N> Envelope<T, N> {
    /// A response with an explicit `total`.
    pub fn with_total(message: impl Into<Cow<'static, str>>, data: T, total: N) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            total: Some(total),
        }
    }
}

impl<T: Serialize, N: Serialize> IntoResponse for Envelope<T, N> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A successful creation, answered with `201 Created`.
#[derive(Debug, Clone)]
pub struct Created<T>(pub Envelope<T>);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// A failed response body.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    success: bool,
    message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldViolation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(
        rename = "availableEndpoints",
        skip_serializing_if = "Option::is_none"
    )]
    available_endpoints: Option<&'static [&'static str]>,
}

impl Failure {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            error: None,
            available_endpoints: None,
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<FieldViolation>) -> Self {
        self.errors = Some(errors);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use]
    pub const fn with_endpoints(mut self, endpoints: &'static [&'static str]) -> Self {
        self.available_endpoints = Some(endpoints);
        self
    }

    /// Pair the body with a status code.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
