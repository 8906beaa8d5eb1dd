//! HTTP middleware stack for the admin API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with redacted URI)
//! 3. Request ID (generate or propagate `x-request-id`)
//! 4. Security headers
//! 5. HTTPS enforcement (production, health endpoints exempt)
//! 6. CORS
//! 7. Body size limit
//! 8. Rate limiting on `/api` (governor, off in development)
//!
//! Authentication is not a layer: handlers opt in with the [`RequireAuth`]
//! and [`RequireAdmin`] extractors.

pub mod auth;
pub mod https;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireAdmin, RequireAuth};
pub use https::require_https_middleware;
pub use rate_limit::{RateLimiterLayer, api_rate_limiter, rate_limit_envelope};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
