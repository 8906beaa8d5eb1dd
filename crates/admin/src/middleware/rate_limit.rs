//! Per-client rate limiting for `/api` using governor and `tower_governor`.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;
use crate::error::AppError;

/// Client IP key extractor for deployments behind a proxy.
///
/// Checks `CF-Connecting-IP`, the first `X-Forwarded-For` hop and
/// `X-Real-IP`, then falls back to the socket peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

const IP_HEADERS: &[&str] = &["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        let from_headers = IP_HEADERS.iter().find_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        });
        if let Some(ip) = from_headers {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Token bucket per client IP: `burst` requests, refilled one every
/// `replenish_secs` seconds. The defaults (100, 9s) allow roughly 100
/// requests per 15 minutes.
///
/// Returns `None` if the configuration is degenerate (zero burst or period).
#[must_use]
pub fn api_rate_limiter(config: &RateLimitConfig) -> Option<RateLimiterLayer> {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(config.replenish_secs)
        .burst_size(config.burst)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(governor)))
}

/// Rewrite the limiter's plain-text 429 into the JSON error envelope,
/// keeping its `retry-after` style headers.
pub async fn rate_limit_envelope(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if response.status() != StatusCode::TOO_MANY_REQUESTS || is_json {
        return response;
    }

    tracing::warn!("Rate limit exceeded");
    let (parts, _) = response.into_parts();
    let mut rewritten = AppError::RateLimited.into_response();
    for (name, value) in &parts.headers {
        if name != CONTENT_TYPE && name != axum::http::header::CONTENT_LENGTH {
            rewritten.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rewritten
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/api/items");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_prefers_cloudflare_header() {
        let req = request(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "198.51.100.1"),
        ]);
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_uses_first_forwarded_hop() {
        let req = request(&[("x-forwarded-for", "198.51.100.1, 10.0.0.2")]);
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "198.51.100.1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request(&[("x-forwarded-for", "not-an-ip")]);
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.9:5123".parse::<SocketAddr>().unwrap()));
        assert_eq!(
            ClientIpKeyExtractor.extract(&req).unwrap(),
            "192.0.2.9".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_no_key_without_ip() {
        assert!(ClientIpKeyExtractor.extract(&request(&[])).is_err());
    }

    #[test]
    fn test_degenerate_config_disables_limiter() {
        let config = RateLimitConfig {
            burst: 0,
            replenish_secs: 9,
        };
        assert!(api_rate_limiter(&config).is_none());
    }

    #[tokio::test]
    async fn test_envelope_rewrites_plain_429() {
        let response = Response::builder()
            .status(StatusCode::TOO_MANY_REQUESTS)
            .header("retry-after", "9")
            .body(axum::body::Body::from("Too Many Requests! Wait for 9s"))
            .unwrap();

        let rewritten = rate_limit_envelope(response).await;
        assert_eq!(rewritten.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(rewritten.headers()["retry-after"], "9");

        let bytes = axum::body::to_bytes(rewritten.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "RATE_LIMIT_EXCEEDED");
    }
}
