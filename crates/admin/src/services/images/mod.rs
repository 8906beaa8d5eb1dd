//! Menu item images.
//!
//! The admin app sends images inline as base64 data URIs. They are checked
//! here ([`DataUri`]) and then pushed to the image CDN
//! ([`CloudinaryClient`]), which hands back the public URL stored on the item.

mod cloudinary;
mod error;

pub use cloudinary::{CloudinaryClient, UploadedImage};
pub use error::{DataUriError, ImageError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// CDN folder for cover images.
pub const COVER_FOLDER: &str = "food-items";
/// CDN folder for detail images.
pub const DETAIL_FOLDER: &str = "food-items/details";

const ALLOWED_TYPES: &[&str] = &["jpeg", "jpg", "png", "webp", "gif"];

/// A validated `data:image/<type>;base64,<payload>` URI.
#[derive(Clone)]
pub struct DataUri {
    raw: String,
    image_type: String,
    decoded_len: usize,
}

impl DataUri {
    /// Validate a data URI and its decoded size.
    ///
    /// # Errors
    ///
    /// Returns `DataUriError` if the URI is malformed, not an allowed image
    /// type, not base64, empty, or larger than `max_bytes` once decoded.
    pub fn parse(input: &str, max_bytes: usize) -> Result<Self, DataUriError> {
        let raw = input.trim();
        let (meta, payload) = raw
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or(DataUriError::InvalidFormat)?;
        let image_type = meta
            .strip_suffix(";base64")
            .and_then(|mime| mime.strip_prefix("image/"))
            .ok_or(DataUriError::InvalidFormat)?
            .to_ascii_lowercase();

        if !ALLOWED_TYPES.contains(&image_type.as_str()) {
            return Err(DataUriError::UnsupportedType(image_type));
        }

        // Base64 expands by 4/3; skip decoding payloads that cannot fit.
        if payload.len() / 4 * 3 > max_bytes + 3 {
            return Err(DataUriError::TooLarge { max_bytes });
        }

        let decoded = STANDARD
            .decode(payload.trim())
            .map_err(|_| DataUriError::InvalidBase64)?;
        if decoded.is_empty() {
            return Err(DataUriError::Empty);
        }
        if decoded.len() > max_bytes {
            return Err(DataUriError::TooLarge { max_bytes });
        }

        Ok(Self {
            raw: raw.to_string(),
            image_type,
            decoded_len: decoded.len(),
        })
    }

    /// The full URI, as sent to the CDN.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Image subtype, e.g. `png`.
    #[must_use]
    pub fn image_type(&self) -> &str {
        &self.image_type
    }

    /// Decoded payload size in bytes.
    #[must_use]
    pub const fn decoded_len(&self) -> usize {
        self.decoded_len
    }
}

impl std::fmt::Debug for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataUri")
            .field("image_type", &self.image_type)
            .field("decoded_len", &self.decoded_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MAX: usize = 5 * 1024 * 1024;

    fn uri(image_type: &str, bytes: &[u8]) -> String {
        format!("data:image/{image_type};base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn test_accepts_supported_types() {
        for ty in ["png", "jpeg", "jpg", "webp", "gif", "PNG"] {
            let parsed = DataUri::parse(&uri(ty, b"\x89PNG fake"), MAX).unwrap();
            assert_eq!(parsed.image_type(), ty.to_ascii_lowercase());
            assert_eq!(parsed.decoded_len(), 9);
        }
    }

    #[test]
    fn test_rejects_non_data_uri() {
        assert_eq!(
            DataUri::parse("https://cdn.example/burger.png", MAX).unwrap_err(),
            DataUriError::InvalidFormat
        );
        assert_eq!(
            DataUri::parse("data:image/png,rawbytes", MAX).unwrap_err(),
            DataUriError::InvalidFormat
        );
        assert_eq!(
            DataUri::parse("data:text/plain;base64,aGk=", MAX).unwrap_err(),
            DataUriError::InvalidFormat
        );
    }

    #[test]
    fn test_rejects_unsupported_type() {
        assert_eq!(
            DataUri::parse(&uri("svg+xml", b"<svg/>"), MAX).unwrap_err(),
            DataUriError::UnsupportedType("svg+xml".to_string())
        );
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert_eq!(
            DataUri::parse("data:image/png;base64,@@@", MAX).unwrap_err(),
            DataUriError::InvalidBase64
        );
        assert_eq!(
            DataUri::parse("data:image/png;base64,", MAX).unwrap_err(),
            DataUriError::Empty
        );
    }

    #[test]
    fn test_size_limit() {
        let image = vec![7_u8; 2048];
        assert!(DataUri::parse(&uri("png", &image), 2048).is_ok());
        assert_eq!(
            DataUri::parse(&uri("png", &image), 2047).unwrap_err(),
            DataUriError::TooLarge { max_bytes: 2047 }
        );
        assert_eq!(
            DataUri::parse(&uri("png", &vec![0_u8; 10 * 1024 * 1024]), MAX).unwrap_err(),
            DataUriError::TooLarge { max_bytes: MAX }
        );
    }

    #[test]
    fn test_too_large_message_in_megabytes() {
        let err = DataUriError::TooLarge { max_bytes: MAX };
        assert_eq!(err.to_string(), "image exceeds the 5 MB limit");
    }

    #[test]
    fn test_debug_omits_payload() {
        let parsed = DataUri::parse(&uri("png", b"secret-bytes"), MAX).unwrap();
        let debug = format!("{parsed:?}");
        assert!(!debug.contains("base64"));
    }
}
