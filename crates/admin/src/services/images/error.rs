//! Image handling error types.

use thiserror::Error;

/// Problems with an image supplied by the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    /// Not a `data:image/...;base64,` URI.
    #[error("image must be a base64 data URI (data:image/<type>;base64,...)")]
    InvalidFormat,

    /// Image type other than jpeg, png, webp or gif.
    #[error("unsupported image type '{0}' (allowed: jpeg, png, webp, gif)")]
    UnsupportedType(String),

    /// The payload is not valid base64.
    #[error("image data is not valid base64")]
    InvalidBase64,

    /// The decoded payload is empty.
    #[error("image data is empty")]
    Empty,

    /// The decoded payload exceeds the configured limit.
    #[error("image exceeds the {} MB limit", .max_bytes / (1024 * 1024))]
    TooLarge {
        /// Configured limit in bytes.
        max_bytes: usize,
    },
}

/// Errors that can occur when talking to the image CDN.
#[derive(Debug, Error)]
pub enum ImageError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The CDN rejected the upload.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The CDN answered with something we could not read.
    #[error("Parse error: {0}")]
    Parse(String),
}
