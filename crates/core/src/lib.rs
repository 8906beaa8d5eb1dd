//! Food Admin Core - Shared types library.
//!
//! This crate provides common types used across all food admin components:
//! - `admin` - The HTTP API backing the mobile admin panel and customer cart
//! - `cli` - Command-line tools for migrations, seeding and role management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, statuses,
//!   and the reporting period / pagination used by the orders report

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
