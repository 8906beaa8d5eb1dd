//! Clients for the managed services behind the API.
//!
//! - [`auth`] - identity provider session tokens (RS256 + JWKS)
//! - [`images`] - image CDN uploads

pub mod auth;
pub mod images;
