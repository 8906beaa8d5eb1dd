//! HTTPS enforcement behind a TLS-terminating proxy.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Reject plain HTTP requests with 403 `HTTPS_REQUIRED` when `FORCE_HTTPS`
/// is on. Health endpoints stay reachable for load balancer health checks, and a
/// server terminating TLS itself is always HTTPS.
pub async fn require_https_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let config = state.config();
    if !config.force_https || config.tls.is_some() || is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let forwarded_https = request
        .headers()
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));

    if forwarded_https {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "Rejected plain HTTP request");
        AppError::HttpsRequired.into_response()
    }
}

fn is_exempt(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/")
}
