//! Token verification error types.

use thiserror::Error;

/// Errors that can occur while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header.
    #[error("no authentication token provided")]
    NoToken,

    /// The token's `exp` is in the past.
    #[error("token has expired")]
    Expired,

    /// Signature, header or claim checks failed.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// The token names a signing key the provider does not publish.
    #[error("signing key not found for kid {0}")]
    UnknownKey(String),

    /// The key set could not be fetched from the identity provider.
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    /// Machine-readable error code for the response envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoToken => "NO_TOKEN",
            Self::Expired => "TOKEN_EXPIRED",
            Self::Invalid(_) | Self::UnknownKey(_) => "INVALID_TOKEN",
            Self::KeySetUnavailable(_) => "AUTH_UNAVAILABLE",
        }
    }

    /// Message safe to show to clients.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::NoToken => "No authentication token provided",
            Self::Expired => "Token has expired, please sign in again",
            Self::Invalid(_) | Self::UnknownKey(_) => "Invalid authentication token",
            Self::KeySetUnavailable(_) => "Authentication service unavailable",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(err.to_string()),
        }
    }
}
