//! Request ID middleware for request tracing and correlation.
//!
//! Every response carries an `x-request-id` header. A usable id sent by the
//! client or a proxy is echoed back; otherwise a UUID v4 is minted. The id is
//! recorded on the current tracing span and tagged on the Sentry scope.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id that is echoed back.
const MAX_INBOUND_LEN: usize = 128;

/// Accept an inbound id only if it is short, non-empty, visible ASCII.
fn usable(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.len() <= MAX_INBOUND_LEN
        && candidate.bytes().all(|b| b.is_ascii_graphic())
}

/// Assign a request id and echo it in the response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| usable(id))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
