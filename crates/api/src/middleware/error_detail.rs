//! Development-only exposure of internal error details.
//!
//! 500 responses carry their real cause in an [`InternalErrorDetail`]
//! extension while the body says only "Algo salió mal". In development this
//! middleware rewrites the body's `error` field with that cause.

use axum::body::Body;
use axum::http::header::CONTENT_LENGTH;
use axum::response::Response;

use crate::envelope::Failure;
use crate::error::{INTERNAL_MESSAGE, InternalErrorDetail};

/// Replace the elided detail of a 500 response with its real cause.
pub async fn expose_error_detail(mut response: Response) -> Response {
    let Some(InternalErrorDetail(detail)) = response.extensions_mut().remove::<InternalErrorDetail>() else {
        return response;
    };

    let body = Failure::new(INTERNAL_MESSAGE).with_error(detail);
    let Ok(bytes) = serde_json::to_vec(&body) else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
