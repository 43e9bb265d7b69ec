//! HTTP middleware for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (accept or mint `x-request-id`, record it on the span)
//! 4. CORS (permissive)
//! 5. Error detail exposure (development only)

pub mod error_detail;
pub mod request_id;

pub use error_detail::expose_error_detail;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
