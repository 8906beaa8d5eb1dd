//! Food Admin API library.
//!
//! JSON backend for the mobile admin panel (catalog, order reporting and
//! status changes) and the customer app (cart, checkout, identity sync).
//! Exposed as a library so the binary, the CLI and the integration tests
//! share one router and one set of repositories.
//!
//! # Security
//!
//! - Every `/api` route authenticates a bearer token from the identity
//!   provider; catalog writes and order management also require the admin
//!   role.
//! - Holds the image CDN API secret and database credentials.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod sanitize;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request, Response, header},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use config::{AppConfig, CorsOrigins};
use state::AppState;

/// Largest accepted request body. Item uploads carry several base64 images.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the CORS layer for the configured frontend origins.
#[must_use]
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = match &config.cors_origins {
        CorsOrigins::Any => AllowOrigin::mirror_request(),
        CorsOrigins::List(list) => {
            let parsed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the complete application router.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// the rate limiter can fall back to the peer address.
pub fn app(state: AppState) -> Router {
    let config = state.config();

    let mut api = routes::api_routes();
    if config.environment.is_development() {
        tracing::debug!("Rate limiting disabled in development");
    } else if let Some(limiter) = middleware::api_rate_limiter(&config.rate_limit) {
        api = api
            .layer(limiter)
            .layer(axum::middleware::map_response(middleware::rate_limit_envelope));
    } else {
        tracing::warn!("Rate limiting disabled: invalid RATE_LIMIT_* configuration");
    }

    let cors = cors_layer(config);

    Router::new()
        .merge(routes::health_routes())
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_https_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %sanitize::redact_uri(request.uri()),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
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
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
