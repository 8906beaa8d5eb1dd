//! Catalog item repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use food_admin_core::{ItemId, ItemSize, Price};

use super::RepositoryError;
use crate::models::{Item, NewItem};

const ITEM_COLUMNS: &str = "id, name, price, category, description, cover_image_url, \
                            detail_image_urls, sizes, available, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    price: Decimal,
    category: String,
    description: Option<String>,
    cover_image_url: String,
    detail_image_urls: Vec<String>,
    sizes: Vec<String>,
    available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let price = Price::from_decimal(row.price)
            .map_err(|e| RepositoryError::corrupt("item price", e))?;
        let sizes = ItemSize::parse_list(&row.sizes)
            .map_err(|e| RepositoryError::corrupt("item size", e))?;

        Ok(Self {
            id: ItemId::new(row.id),
            name: row.name,
            price,
            category: row.category,
            description: row.description,
            cover_image_url: row.cover_image_url,
            detail_image_urls: row.detail_image_urls,
            sizes,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn size_names(sizes: &[ItemSize]) -> Vec<&'static str> {
    sizes.iter().map(ItemSize::as_str).collect()
}

/// Filters for listing items. Empty filters list everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Exact category, compared case-insensitively.
    pub category: Option<String>,
    pub available: Option<bool>,
}

/// Repository for catalog items.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List items newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE ($1::text IS NULL OR lower(category) = lower($1)) \
               AND ($2::bool IS NULL OR available = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.available)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    /// Get an item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    /// Insert a new item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, item: &NewItem) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO items \
                 (name, price, category, description, cover_image_url, \
                  detail_image_urls, sizes, available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.category)
        .bind(item.description.as_deref())
        .bind(&item.cover_image_url)
        .bind(&item.detail_image_urls)
        .bind(size_names(&item.sizes))
        .bind(item.available)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        Item::try_from(row)
    }

    /// Write every mutable field of `item`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item no longer exists.
    pub async fn update(&self, item: &Item) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE items SET \
                 name = $2, price = $3, category = $4, description = $5, \
                 cover_image_url = $6, detail_image_urls = $7, sizes = $8, available = $9 \
             WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.category)
        .bind(item.description.as_deref())
        .bind(&item.cover_image_url)
        .bind(&item.detail_image_urls)
        .bind(size_names(&item.sizes))
        .bind(item.available)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_write)?
        .ok_or(RepositoryError::NotFound)?;

        Item::try_from(row)
    }

    /// Delete an item. Cart lines referencing it cascade.
    ///
    /// Returns `false` when nothing was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the whole catalog. Used by `fa-cli seed catalog --clear`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM items").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}
