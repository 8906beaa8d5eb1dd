//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FOOD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `AUTH_JWKS_URL` - JWKS endpoint of the identity provider
//! - `CLOUDINARY_CLOUD_NAME` - Image CDN cloud name
//! - `CLOUDINARY_API_KEY` - Image CDN API key
//! - `CLOUDINARY_API_SECRET` - Image CDN API secret (used to sign uploads)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `APP_ENV` - `development`, `test` or `production` (default: development)
//! - `FRONTEND_URL` - Comma-separated CORS origins, `*` mirrors any origin
//!   (default: `http://localhost:8081`)
//! - `AUTH_ISSUER` - Expected `iss` claim
//! - `AUTH_AUTHORIZED_PARTIES` - Comma-separated allow-list for the `azp` claim
//! - `CLOUDINARY_BASE_URL` - CDN API base (default: `https://api.cloudinary.com`)
//! - `MAX_IMAGE_BYTES` - Largest accepted decoded image (default: 5 MiB)
//! - `STORE_UTC_OFFSET` - Store timezone for reports (default: +00:00)
//! - `FORCE_HTTPS` - Reject plain HTTP behind the proxy (default: true in production)
//! - `RATE_LIMIT_PER_WINDOW` - Request burst per client IP (default: 100)
//! - `RATE_LIMIT_REPLENISH_SECS` - Seconds per replenished request (default: 9)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (TLS)
//! - `TLS_CERT` - PEM-encoded certificate chain
//! - `TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::FixedOffset;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use food_admin_core::parse_utc_offset;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:8081";
const DEFAULT_CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "APP_ENV".to_string(),
                format!("unknown environment '{other}'"),
            )),
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `FRONTEND_URL=*`: reflect whatever origin asks.
    Any,
    /// Exact origins.
    List(Vec<String>),
}

impl CorsOrigins {
    fn parse(value: &str) -> Self {
        if value.trim() == "*" {
            return Self::Any;
        }
        let origins: Vec<String> = split_list(value);
        if origins.is_empty() {
            Self::List(vec![DEFAULT_FRONTEND_URL.to_string()])
        } else {
            Self::List(origins)
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// CORS origins for the mobile/web clients
    pub cors_origins: CorsOrigins,
    /// Identity provider token verification
    pub auth: AuthConfig,
    /// Image CDN credentials
    pub cloudinary: CloudinaryConfig,
    /// Largest accepted decoded image in bytes
    pub max_image_bytes: usize,
    /// Store timezone used for order reports
    pub store_offset: FixedOffset,
    /// Reject requests that did not arrive over HTTPS at the proxy
    pub force_https: bool,
    /// Per-IP rate limiting on `/api`
    pub rate_limit: RateLimitConfig,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Where the provider publishes its signing keys
    pub jwks_url: Url,
    /// Expected `iss` claim, when set
    pub issuer: Option<String>,
    /// Accepted `azp` values; empty means unchecked
    pub authorized_parties: Vec<String>,
}

/// Image CDN configuration.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// Cloud (account) name
    pub cloud_name: String,
    /// Public API key
    pub api_key: String,
    /// API secret used to sign uploads
    pub api_secret: SecretString,
    /// API base URL
    pub base_url: Url,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Rate limiter settings (token bucket per client IP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Bucket size
    pub burst: u32,
    /// Seconds to replenish one request
    pub replenish_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 100,
            replenish_secs: 9,
        }
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env("TLS_CERT");
        let key_pem = get_optional_env("TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "TLS_*".to_string(),
                "Both TLS_CERT and TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

/// Result of [`AppConfig::security_report`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SecurityReport {
    /// Problems that block a production start.
    pub issues: Vec<String>,
    /// Things worth a log line.
    pub warnings: Vec<String>,
}

impl SecurityReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.warnings.is_empty()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("FOOD_DATABASE_URL")?;
        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_parsed_or_default("PORT", 3000_u16)?;
        let environment = Environment::parse(&get_env_or_default("APP_ENV", "development"))?;
        let cors_origins = CorsOrigins::parse(&get_env_or_default("FRONTEND_URL", DEFAULT_FRONTEND_URL));

        let auth = AuthConfig::from_env()?;
        let cloudinary = CloudinaryConfig::from_env()?;
        let max_image_bytes = get_parsed_or_default("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?;
        let store_offset = parse_utc_offset(&get_env_or_default("STORE_UTC_OFFSET", "+00:00"))
            .map_err(|e| ConfigError::InvalidEnvVar("STORE_UTC_OFFSET".to_string(), e.to_string()))?;
        let force_https = match get_optional_env("FORCE_HTTPS") {
            Some(value) => parse_bool("FORCE_HTTPS", &value)?,
            None => environment.is_production(),
        };
        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            burst: get_parsed_or_default("RATE_LIMIT_PER_WINDOW", defaults.burst)?,
            replenish_secs: get_parsed_or_default("RATE_LIMIT_REPLENISH_SECS", defaults.replenish_secs)?,
        };
        if rate_limit.burst == 0 || rate_limit.replenish_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "RATE_LIMIT_*".to_string(),
                "values must be greater than zero".to_string(),
            ));
        }
        let log_format = match get_env_or_default("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let tls = TlsConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            cors_origins,
            auth,
            cloudinary,
            max_image_bytes,
            store_offset,
            force_https,
            rate_limit,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the development mock token is honoured.
    #[must_use]
    pub const fn allows_mock_token(&self) -> bool {
        !self.environment.is_production()
    }

    /// Check the loaded configuration for insecure settings.
    ///
    /// In production any issue should abort startup; elsewhere they are
    /// only logged.
    #[must_use]
    pub fn security_report(&self) -> SecurityReport {
        let mut report = SecurityReport::default();
        let production = self.environment.is_production();

        if production && self.cors_origins == CorsOrigins::Any {
            report
                .issues
                .push("FRONTEND_URL should not be wildcard (*) in production; list exact origins".to_string());
        }
        if production && self.auth.jwks_url.scheme() != "https" {
            report
                .issues
                .push("AUTH_JWKS_URL must use https in production".to_string());
        }
        if production && !self.force_https {
            report
                .issues
                .push("FORCE_HTTPS is disabled in production".to_string());
        }
        if let Err(e) = validate_secret_strength(
            self.cloudinary.api_secret.expose_secret(),
            "CLOUDINARY_API_SECRET",
        ) {
            report.issues.push(e.to_string());
        }

        if self.auth.issuer.is_none() {
            report
                .warnings
                .push("AUTH_ISSUER not set; token issuer is not checked".to_string());
        }
        if self.cors_origins == CorsOrigins::Any && !production {
            report
                .warnings
                .push("FRONTEND_URL is wildcard (*); any origin may call the API".to_string());
        }

        report
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("AUTH_JWKS_URL")?;
        let jwks_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("AUTH_JWKS_URL".to_string(), e.to_string()))?;

        Ok(Self {
            jwks_url,
            issuer: get_optional_env("AUTH_ISSUER").filter(|s| !s.trim().is_empty()),
            authorized_parties: get_optional_env("AUTH_AUTHORIZED_PARTIES")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
        })
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_base = get_env_or_default("CLOUDINARY_BASE_URL", DEFAULT_CLOUDINARY_BASE_URL);
        let base_url = Url::parse(&raw_base)
            .map(directory_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CLOUDINARY_BASE_URL".to_string(), e.to_string()))?;

        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_required_secret("CLOUDINARY_API_SECRET")?,
            base_url,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Ensure the path ends with `/`, so `Url::join` appends to it instead of
/// replacing its last segment.
#[must_use]
pub fn directory_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got '{other}'"),
        )),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret issued by the CDN dashboard."
            ),
        ));
    }

    Ok(())
}
