//! Request types and validation for the order endpoints.

use serde::Deserialize;

use food_admin_core::{OrderStatus, Pagination, PeriodError, ReportPeriod};

use crate::error::FieldError;
use crate::models::DeliveryDetails;

const MAX_DELIVERY_FIELD_LEN: usize = 200;

// =============================================================================
// Query Parameters
// =============================================================================

/// Query string of `GET /api/orders`.
///
/// Every field is read as text so malformed numbers become field errors
/// rather than a generic query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    /// `all`, `day`, `month` or `year`.
    pub mode: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Optional status filter.
    pub status: Option<String>,
}

/// A validated report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    pub period: ReportPeriod,
    pub status: Option<OrderStatus>,
    pub pagination: Pagination,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn number<T: std::str::FromStr>(
    field: &'static str,
    value: Option<&String>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = present(value)?;
    raw.parse().map_or_else(
        |_| {
            errors.push(FieldError::new(field, format!("{field} must be a number")));
            None
        },
        Some,
    )
}

fn period_error(err: &PeriodError) -> FieldError {
    let field = match err {
        PeriodError::Missing { field, .. } => *field,
        PeriodError::YearOutOfRange(_) => "year",
        PeriodError::InvalidDate(_) => "date",
        PeriodError::UnknownMode(_) | PeriodError::InvalidOffset(_) => "mode",
    };
    FieldError::new(field, err.to_string())
}

impl OrdersQuery {
    /// Validate the query into a period, status filter and page window.
    ///
    /// Unparseable `page`/`limit` values fall back to the defaults.
    pub fn validate(&self) -> Result<ReportRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let year = number::<i32>("year", self.year.as_ref(), &mut errors);
        let month = number::<u32>("month", self.month.as_ref(), &mut errors);
        let day = number::<u32>("day", self.day.as_ref(), &mut errors);

        let status = match present(self.status.as_ref()) {
            None => None,
            Some(raw) => match raw.parse::<OrderStatus>() {
                Ok(status) => Some(status),
                Err(e) => {
                    errors.push(FieldError::new("status", e.to_string()));
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let period = ReportPeriod::from_parts(present(self.mode.as_ref()), year, month, day)
            .map_err(|e| vec![period_error(&e)])?;

        let pagination = Pagination::new(
            present(self.page.as_ref()).and_then(|p| p.parse().ok()),
            present(self.limit.as_ref()).and_then(|l| l.parse().ok()),
        );

        Ok(ReportRequest {
            period,
            status,
            pagination,
        })
    }
}

// =============================================================================
// Bodies
// =============================================================================

/// Body of `PATCH /api/orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

impl StatusUpdateRequest {
    pub fn validate(&self) -> Result<OrderStatus, Vec<FieldError>> {
        let Some(raw) = present(self.status.as_ref()) else {
            return Err(vec![FieldError::new("status", "status is required")]);
        };
        raw.parse()
            .map_err(|e: food_admin_core::UnknownVariant| vec![FieldError::new("status", e.to_string())])
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
}

impl CheckoutRequest {
    pub fn validate(&self) -> Result<DeliveryDetails, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut required = |field: &'static str, value: Option<&String>| -> String {
            match present(value) {
                Some(v) if v.chars().count() > MAX_DELIVERY_FIELD_LEN => {
                    errors.push(FieldError::new(
                        field,
                        format!("{field} must be at most {MAX_DELIVERY_FIELD_LEN} characters"),
                    ));
                    String::new()
                }
                Some(v) => v.to_owned(),
                None => {
                    errors.push(FieldError::new(field, format!("{field} is required")));
                    String::new()
                }
            }
        };

        let details = DeliveryDetails {
            first_name: required("firstName", self.first_name.as_ref()),
            last_name: required("lastName", self.last_name.as_ref()),
            phone_number: required("phoneNumber", self.phone_number.as_ref()),
            street: required("street", self.street.as_ref()),
            city: required("city", self.city.as_ref()),
        };

        if errors.is_empty() {
            Ok(details)
        } else {
            Err(errors)
        }
    }
}
