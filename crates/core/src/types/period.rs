//! Reporting periods and pagination for the orders report.
//!
//! The admin panel asks for "all orders", "orders on a day", "in a month" or
//! "in a year". Calendar units are interpreted in the store's fixed UTC
//! offset and turned into a half-open `[start, end)` range of instants.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Earliest year a report period may name.
pub const MIN_REPORT_YEAR: i32 = 1970;
/// Latest year a report period may name.
pub const MAX_REPORT_YEAR: i32 = 9999;

/// Errors building a [`ReportPeriod`] from query parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// `mode` is not one of `all`, `day`, `month`, `year`.
    #[error("mode must be one of: all, day, month, year")]
    UnknownMode(String),
    /// A component required by the mode is missing.
    #[error("{field} is required when mode is {mode}")]
    Missing {
        /// Mode that needed the field.
        mode: &'static str,
        /// The missing query field.
        field: &'static str,
    },
    /// The year is outside `MIN_REPORT_YEAR..=MAX_REPORT_YEAR`.
    #[error("year must be between 1970 and 9999")]
    YearOutOfRange(i32),
    /// The components do not form a real calendar date.
    #[error("{0} is not a valid date")]
    InvalidDate(String),
    /// The store offset could not be parsed.
    #[error("invalid UTC offset {0:?} (expected e.g. +05:00)")]
    InvalidOffset(String),
}

/// A calendar period in store-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ReportPeriod {
    /// No date filter.
    #[default]
    All,
    /// A single calendar day.
    Day {
        /// The day.
        date: NaiveDate,
    },
    /// A calendar month.
    Month {
        /// Four-digit year.
        year: i32,
        /// Month number, 1-12.
        month: u32,
    },
    /// A calendar year.
    Year {
        /// Four-digit year.
        year: i32,
    },
}

impl ReportPeriod {
    /// Build a period from the report query fields.
    ///
    /// `mode` defaults to `all`; the other fields are only consulted when the
    /// mode needs them.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError`] for unknown modes, missing components, years
    /// outside 1970-9999 and impossible dates (e.g. February 30th).
    pub fn from_parts(
        mode: Option<&str>,
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
    ) -> Result<Self, PeriodError> {
        let mode = mode.map(str::trim).filter(|m| !m.is_empty()).unwrap_or("all");

        match mode.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "year" => {
                let year = year.ok_or(PeriodError::Missing {
                    mode: "year",
                    field: "year",
                })?;
                check_year(year)?;
                Ok(Self::Year { year })
            }
            "month" => {
                let year = year.ok_or(PeriodError::Missing {
                    mode: "month",
                    field: "year",
                })?;
                let month = month.ok_or(PeriodError::Missing {
                    mode: "month",
                    field: "month",
                })?;
                check_year(year)?;
                NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or_else(|| PeriodError::InvalidDate(format!("{year}-{month:02}")))?;
                Ok(Self::Month { year, month })
            }
            "day" => {
                let (Some(year), Some(month), Some(day)) = (year, month, day) else {
                    let field = if year.is_none() {
                        "year"
                    } else if month.is_none() {
                        "month"
                    } else {
                        "day"
                    };
                    return Err(PeriodError::Missing { mode: "day", field });
                };
                check_year(year)?;
                let date = NaiveDate::from_ymd_opt(year, month, day)
                    .ok_or_else(|| PeriodError::InvalidDate(format!("{year}-{month:02}-{day:02}")))?;
                Ok(Self::Day { date })
            }
            other => Err(PeriodError::UnknownMode(other.to_owned())),
        }
    }

    /// Half-open `[start, end)` range of instants covered by the period in
    /// the given store offset. `All` has no bounds, and neither does a
    /// period chrono cannot represent; callers must not read the latter as
    /// "everything".
    #[must_use]
    pub fn bounds(&self, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = match *self {
            Self::All => return None,
            Self::Day { date } => (date, date.succ_opt()?),
            Self::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let end = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                (start, end)
            }
            Self::Year { year } => (
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            ),
        };

        Some((local_midnight(start, offset)?, local_midnight(end, offset)?))
    }

    /// Short label used in logs, e.g. `2025-03`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::All => "all".to_owned(),
            Self::Day { date } => date.format("%Y-%m-%d").to_string(),
            Self::Month { year, month } => format!("{year}-{month:02}"),
            Self::Year { year } => year.to_string(),
        }
    }
}

fn check_year(year: i32) -> Result<(), PeriodError> {
    if (MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(PeriodError::YearOutOfRange(year))
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a store offset such as `+05:00`, `-03:30`, `Z` or `UTC`.
///
/// # Errors
///
/// Returns [`PeriodError::InvalidOffset`] if the string is not an offset.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, PeriodError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(|| PeriodError::InvalidOffset(s.to_owned()));
    }
    trimmed
        .parse::<FixedOffset>()
        .map_err(|_| PeriodError::InvalidOffset(s.to_owned()))
}

/// Page window for list endpoints. Out-of-range input is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 15;
    /// Largest accepted page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Build a window from optional query values.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, i64::from(u32::MAX));
        let limit = limit
            .unwrap_or(i64::from(Self::DEFAULT_LIMIT))
            .clamp(1, i64::from(Self::MAX_LIMIT));

        Self {
            page: u32::try_from(page).unwrap_or(1),
            limit: u32::try_from(limit).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Whether rows remain after this page given the total match count.
    #[must_use]
    pub fn has_more(&self, total: i64) -> bool {
        self.offset() + i64::from(self.limit) < total
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_mode_defaults_to_all() {
        assert_eq!(
            ReportPeriod::from_parts(None, Some(2024), None, None).unwrap(),
            ReportPeriod::All
        );
        assert_eq!(
            ReportPeriod::from_parts(Some(""), None, None, None).unwrap(),
            ReportPeriod::All
        );
        assert!(ReportPeriod::All.bounds(FixedOffset::east_opt(0).unwrap()).is_none());
    }

    #[test]
    fn test_day_bounds_in_store_offset() {
        let period = ReportPeriod::from_parts(Some("day"), Some(2025), Some(3), Some(9)).unwrap();
        let offset = parse_utc_offset("+05:00").unwrap();
        let (start, end) = period.bounds(offset).unwrap();
        assert_eq!(start, utc("2025-03-08T19:00:00Z"));
        assert_eq!(end, utc("2025-03-09T19:00:00Z"));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let period = ReportPeriod::from_parts(Some("month"), Some(2024), Some(12), None).unwrap();
        let (start, end) = period.bounds(FixedOffset::east_opt(0).unwrap()).unwrap();
        assert_eq!(start, utc("2024-12-01T00:00:00Z"));
        assert_eq!(end, utc("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_year_bounds() {
        let period = ReportPeriod::from_parts(Some("YEAR"), Some(2024), None, None).unwrap();
        let (start, end) = period.bounds(parse_utc_offset("UTC").unwrap()).unwrap();
        assert_eq!(start, utc("2024-01-01T00:00:00Z"));
        assert_eq!(end, utc("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_missing_components() {
        assert_eq!(
            ReportPeriod::from_parts(Some("month"), Some(2024), None, None),
            Err(PeriodError::Missing {
                mode: "month",
                field: "month"
            })
        );
        assert_eq!(
            ReportPeriod::from_parts(Some("day"), Some(2024), Some(2), None),
            Err(PeriodError::Missing {
                mode: "day",
                field: "day"
            })
        );
        assert!(matches!(
            ReportPeriod::from_parts(Some("year"), None, None, None),
            Err(PeriodError::Missing { field: "year", .. })
        ));
    }

    #[test]
    fn test_impossible_dates_rejected() {
        assert!(matches!(
            ReportPeriod::from_parts(Some("day"), Some(2025), Some(2), Some(30)),
            Err(PeriodError::InvalidDate(_))
        ));
        assert!(matches!(
            ReportPeriod::from_parts(Some("month"), Some(2025), Some(13), None),
            Err(PeriodError::InvalidDate(_))
        ));
        assert!(matches!(
            ReportPeriod::from_parts(Some("week"), None, None, None),
            Err(PeriodError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_year_range_applies_to_every_mode() {
        assert_eq!(
            ReportPeriod::from_parts(Some("year"), Some(262_142), None, None),
            Err(PeriodError::YearOutOfRange(262_142))
        );
        assert_eq!(
            ReportPeriod::from_parts(Some("day"), Some(262_142), Some(12), Some(31)),
            Err(PeriodError::YearOutOfRange(262_142))
        );
        assert_eq!(
            ReportPeriod::from_parts(Some("day"), Some(5), Some(1), Some(1)),
            Err(PeriodError::YearOutOfRange(5))
        );
        assert_eq!(
            ReportPeriod::from_parts(Some("month"), Some(1969), Some(12), None),
            Err(PeriodError::YearOutOfRange(1969))
        );
    }

    #[test]
    fn test_accepted_periods_always_have_bounds() {
        let offsets = ["+14:00", "-12:00", "+00:00"].map(|o| parse_utc_offset(o).unwrap());
        let periods = [
            ReportPeriod::from_parts(Some("year"), Some(MAX_REPORT_YEAR), None, None),
            ReportPeriod::from_parts(Some("month"), Some(MAX_REPORT_YEAR), Some(12), None),
            ReportPeriod::from_parts(Some("day"), Some(MAX_REPORT_YEAR), Some(12), Some(31)),
            ReportPeriod::from_parts(Some("day"), Some(MIN_REPORT_YEAR), Some(1), Some(1)),
        ];
        for period in periods {
            let period = period.unwrap();
            for offset in offsets {
                assert!(period.bounds(offset).is_some(), "{period:?} at {offset}");
            }
        }
    }

    #[test]
    fn test_offset_parsing() {
        assert_eq!(parse_utc_offset("-03:30").unwrap().local_minus_utc(), -12600);
        assert!(parse_utc_offset("Mars/Olympus").is_err());
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let p = Pagination::default();
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 15, 0));

        let p = Pagination::new(Some(0), Some(500));
        assert_eq!((p.page(), p.limit()), (1, 100));

        let p = Pagination::new(Some(3), Some(-4));
        assert_eq!((p.page(), p.limit(), p.offset()), (3, 1, 2));
    }

    #[test]
    fn test_has_more() {
        let p = Pagination::new(Some(2), Some(10));
        assert!(p.has_more(21));
        assert!(!p.has_more(20));
    }
}
