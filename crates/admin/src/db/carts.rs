//! Customer cart repository.
//!
//! Carts are keyed by the identity provider subject and created lazily on
//! first read or write.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use food_admin_core::{CartId, CartItemId, ItemId, ItemSize, Price};

use super::RepositoryError;
use crate::models::{Cart, CartLine};

/// Largest quantity a single cart line may hold, merges included.
pub const MAX_LINE_QUANTITY: u16 = 999;

fn quantity_out_of_range() -> RepositoryError {
    RepositoryError::InvalidInput {
        field: "quantity",
        message: format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
    }
}

/// Check a requested line quantity and convert it for the `INTEGER` column.
fn line_quantity(quantity: u32) -> Result<i32, RepositoryError> {
    match u16::try_from(quantity) {
        Ok(q) if (1..=MAX_LINE_QUANTITY).contains(&q) => Ok(i32::from(q)),
        _ => Err(quantity_out_of_range()),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: Uuid,
    item_id: Uuid,
    name: String,
    price: Decimal,
    category: String,
    cover_image_url: String,
    quantity: i32,
    size: Option<String>,
    added_at: DateTime<Utc>,
    available: bool,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let price = Price::from_decimal(row.price)
            .map_err(|e| RepositoryError::corrupt("item price", e))?;
        let quantity = u32::try_from(row.quantity)
            .map_err(|e| RepositoryError::corrupt("cart quantity", e))?;
        let size = row
            .size
            .as_deref()
            .map(str::parse::<ItemSize>)
            .transpose()
            .map_err(|e| RepositoryError::corrupt("cart size", e))?;

        Ok(Self {
            id: CartItemId::new(row.id),
            item_id: ItemId::new(row.item_id),
            name: row.name,
            price,
            category: row.category,
            image_url: row.cover_image_url,
            quantity,
            size,
            subtotal: price.times(quantity),
            added_at: row.added_at,
            available: row.available,
        })
    }
}

/// Lines of a cart joined with their items, oldest first. Lines whose item
/// is gone are skipped by the join.
///
/// Generic over the executor so checkout can read inside its transaction.
pub(crate) async fn fetch_lines<'e>(
    executor: impl PgExecutor<'e>,
    cart_id: CartId,
    lock: bool,
) -> Result<Vec<CartLine>, RepositoryError> {
    let sql = format!(
        "SELECT ci.id, ci.item_id, i.name, i.price, i.category, i.cover_image_url, \
                ci.quantity, ci.size, ci.added_at, i.available \
         FROM cart_items ci \
         JOIN items i ON i.id = ci.item_id \
         WHERE ci.cart_id = $1 \
         ORDER BY ci.added_at, ci.id{}",
        if lock { " FOR UPDATE OF ci" } else { "" }
    );

    let rows = sqlx::query_as::<_, CartLineRow>(&sql)
        .bind(cart_id)
        .fetch_all(executor)
        .await?;

    rows.into_iter().map(CartLine::try_from).collect()
}

/// Repository for customer carts.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the cart id for a user without creating one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_id(&self, user_id: &str) -> Result<Option<CartId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM carts WHERE user_external_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(id.map(CartId::new))
    }

    /// Get the user's cart id, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn get_or_create_id(&self, user_id: &str) -> Result<CartId, RepositoryError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO carts (user_external_id) VALUES ($1) \
             ON CONFLICT (user_external_id) DO UPDATE SET updated_at = carts.updated_at \
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(CartId::new(id))
    }

    /// Load the user's cart with its lines, creating an empty cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn load(&self, user_id: &str) -> Result<Cart, RepositoryError> {
        let id = self.get_or_create_id(user_id).await?;
        let lines = fetch_lines(self.pool, id, false).await?;

        Ok(Cart {
            id,
            user_id: user_id.to_owned(),
            lines,
        })
    }

    /// Add `quantity` of an item. An existing line for the same item and
    /// size is increased instead of duplicated, up to [`MAX_LINE_QUANTITY`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if the line would exceed
    /// [`MAX_LINE_QUANTITY`] and `RepositoryError::Database` if the upsert
    /// fails.
    pub async fn add(
        &self,
        cart_id: CartId,
        item_id: ItemId,
        quantity: u32,
        size: Option<ItemSize>,
    ) -> Result<CartItemId, RepositoryError> {
        let quantity = line_quantity(quantity)?;

        // The conditional update returns no row when the merge would overflow.
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO cart_items (cart_id, item_id, quantity, size) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (cart_id, item_id, (COALESCE(size, ''))) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
             WHERE cart_items.quantity + EXCLUDED.quantity <= $5 \
             RETURNING id",
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(quantity)
        .bind(size.map(|s| s.as_str()))
        .bind(i32::from(MAX_LINE_QUANTITY))
        .fetch_optional(self.pool)
        .await?;

        let Some(id) = id else {
            return Err(RepositoryError::InvalidInput {
                field: "quantity",
                message: format!("A cart line can hold at most {MAX_LINE_QUANTITY} of an item"),
            });
        };

        self.touch(cart_id).await?;
        Ok(CartItemId::new(id))
    }

    /// Set the quantity of one line. Returns `false` if the line is not in
    /// this cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` for quantities outside
    /// `1..=MAX_LINE_QUANTITY` and `RepositoryError::Database` if the update
    /// fails.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        line_id: CartItemId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let quantity = line_quantity(quantity)?;

        let result =
            sqlx::query("UPDATE cart_items SET quantity = $3 WHERE id = $1 AND cart_id = $2")
                .bind(line_id)
                .bind(cart_id)
                .bind(quantity)
                .execute(self.pool)
                .await?;

        if result.rows_affected() > 0 {
            self.touch(cart_id).await?;
        }
        Ok(result.rows_affected() > 0)
    }

    /// Remove one line. Returns `false` if nothing was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, cart_id: CartId, line_id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
            .bind(line_id)
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_quantity_bounds() {
        assert!(matches!(line_quantity(1), Ok(1)));
        assert!(matches!(line_quantity(999), Ok(999)));

        for out_of_range in [0, 1000, u32::MAX] {
            let err = line_quantity(out_of_range).unwrap_err();
            assert!(
                matches!(err, RepositoryError::InvalidInput { field: "quantity", .. }),
                "{out_of_range}: {err:?}"
            );
        }
    }
}
