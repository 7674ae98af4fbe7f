//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Body size limit

pub mod auth;
pub mod request_id;

pub use auth::{RequireAdmin, RequireUser};
pub use request_id::request_id_middleware;
