//! Core types for the food admin backend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod period;
pub mod price;
pub mod size;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use period::{
    MAX_REPORT_YEAR, MIN_REPORT_YEAR, Pagination, PeriodError, ReportPeriod, parse_utc_offset,
};
pub use price::{CURRENCY_SYMBOL, MAX_UNIT_PRICE_CENTS, Price, PriceError};
pub use size::ItemSize;
pub use status::*;
