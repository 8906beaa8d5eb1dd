//! Order repository: reporting, status updates and checkout.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use food_admin_core::{OrderId, OrderStatus, Pagination, Price, ReportPeriod};

use super::RepositoryError;
use super::carts::fetch_lines;
use crate::models::{DeliveryDetails, NewOrder, Order, OrderLine, OrdersReport};

const ORDER_COLUMNS: &str = "id, user_external_id, first_name, last_name, phone_number, \
                             street, city, items, total, status, created_at, updated_at";

const REPORT_WHERE: &str = "($1::timestamptz IS NULL OR created_at >= $1) \
                            AND ($2::timestamptz IS NULL OR created_at < $2) \
                            AND ($3::order_status IS NULL OR status = $3)";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_external_id: String,
    first_name: String,
    last_name: String,
    phone_number: String,
    street: String,
    city: String,
    items: serde_json::Value,
    total: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<OrderLine> = serde_json::from_value(row.items)
            .map_err(|e| RepositoryError::corrupt("order items", e))?;
        let total = Price::from_decimal(row.total)
            .map_err(|e| RepositoryError::corrupt("order total", e))?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: row.user_external_id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            street: row.street,
            city: row.city,
            items,
            total,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReportTotalsRow {
    total_count: i64,
    total_revenue: Decimal,
}

/// Report filter: a calendar period in the store's offset plus an optional
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
    pub period: ReportPeriod,
    pub store_offset: FixedOffset,
    pub status: Option<OrderStatus>,
}

/// `created_at` range for the report query; either side may be open.
type ReportRange = (Option<DateTime<Utc>>, Option<DateTime<Utc>>);

impl OrderFilter {
    /// `None` when an explicit period has no representable bounds. Such a
    /// period matches no orders; only `All` is unbounded.
    fn bounds(&self) -> Option<ReportRange> {
        match self.period {
            ReportPeriod::All => Some((None, None)),
            period => period
                .bounds(self.store_offset)
                .map(|(start, end)| (Some(start), Some(end))),
        }
    }
}

/// Result of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Placed(Order),
    /// No cart, or a cart without lines.
    EmptyCart,
    /// Names of cart items that are no longer available.
    Unavailable(Vec<String>),
    /// The total does not fit an order; carries the computed total.
    TotalTooLarge(Price),
}

async fn insert_order<'e>(
    executor: impl PgExecutor<'e>,
    order: &NewOrder,
) -> Result<Order, RepositoryError> {
    let items = serde_json::to_value(&order.items)
        .map_err(|e| RepositoryError::DataCorruption(format!("unserializable order items: {e}")))?;

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO orders \
             (user_external_id, first_name, last_name, phone_number, street, city, \
              items, total, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending') \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(&order.user_id)
    .bind(&order.delivery.first_name)
    .bind(&order.delivery.last_name)
    .bind(&order.delivery.phone_number)
    .bind(&order.delivery.street)
    .bind(&order.delivery.city)
    .bind(items)
    .bind(order.total())
    .fetch_one(executor)
    .await?;

    Order::try_from(row)
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of orders (newest first) with count and revenue over the
    /// whole filtered range.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn report(
        &self,
        filter: &OrderFilter,
        page: Pagination,
    ) -> Result<OrdersReport, RepositoryError> {
        let Some((start, end)) = filter.bounds() else {
            tracing::warn!(period = %filter.period.label(), "Report period has no bounds");
            return Ok(OrdersReport {
                orders: Vec::new(),
                total_count: 0,
                total_revenue: Price::ZERO,
            });
        };

        let totals = sqlx::query_as::<_, ReportTotalsRow>(&format!(
            "SELECT COUNT(*) AS total_count, COALESCE(SUM(total), 0) AS total_revenue \
             FROM orders WHERE {REPORT_WHERE}"
        ))
        .bind(start)
        .bind(end)
        .bind(filter.status)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE {REPORT_WHERE} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(start)
        .bind(end)
        .bind(filter.status)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total_revenue = Price::from_decimal(totals.total_revenue)
            .map_err(|e| RepositoryError::corrupt("revenue", e))?;

        Ok(OrdersReport {
            orders,
            total_count: totals.total_count,
            total_revenue,
        })
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Move an order from `expected` to `next`.
    ///
    /// Returns `None` when the order is no longer in `expected` (or is gone),
    /// so a concurrent update cannot be overwritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $3 \
             WHERE id = $1 AND status = $2 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Turn the user's cart into a pending order and empty the cart, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back.
    pub async fn checkout(
        &self,
        user_id: &str,
        delivery: DeliveryDetails,
    ) -> Result<CheckoutOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM carts WHERE user_external_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(cart_id) = cart_id.map(food_admin_core::CartId::new) else {
            return Ok(CheckoutOutcome::EmptyCart);
        };

        let lines = fetch_lines(&mut *tx, cart_id, true).await?;
        if lines.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let unavailable: Vec<String> = lines
            .iter()
            .filter(|line| !line.available)
            .map(|line| line.name.clone())
            .collect();
        if !unavailable.is_empty() {
            return Ok(CheckoutOutcome::Unavailable(unavailable));
        }

        let new_order = NewOrder {
            user_id: user_id.to_owned(),
            delivery,
            items: lines
                .into_iter()
                .map(|line| OrderLine {
                    item_id: Some(line.item_id),
                    name: line.name,
                    quantity: line.quantity,
                    price: line.price,
                    size: line.size,
                })
                .collect(),
        };
        if !new_order.total_fits() {
            return Ok(CheckoutOutcome::TotalTooLarge(new_order.total()));
        }
        let order = insert_order(&mut *tx, &new_order).await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            lines = order.items.len(),
            total = %order.total,
            "Order placed"
        );
        Ok(CheckoutOutcome::Placed(order))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filter(period: ReportPeriod) -> OrderFilter {
        OrderFilter {
            period,
            store_offset: FixedOffset::east_opt(5 * 3600).unwrap(),
            status: None,
        }
    }

    #[test]
    fn test_all_is_the_only_unbounded_filter() {
        assert_eq!(filter(ReportPeriod::All).bounds(), Some((None, None)));

        let (start, end) = filter(ReportPeriod::Month { year: 2025, month: 3 })
            .bounds()
            .unwrap();
        assert_eq!(start.unwrap().to_rfc3339(), "2025-02-28T19:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2025-03-31T19:00:00+00:00");
    }

    #[test]
    fn test_unrepresentable_period_has_no_bounds() {
        assert_eq!(filter(ReportPeriod::Year { year: i32::MAX }).bounds(), None);
    }
}
