//! Menu items.

use chrono::{DateTime, Utc};
use serde::Serialize;

use food_admin_core::{ItemId, ItemSize, Price};

/// A catalog item as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub category: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub cover_image_url: String,
    #[serde(rename = "detail_image_url")]
    pub detail_image_urls: Vec<String>,
    pub sizes: Vec<ItemSize>,
    pub available: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// A validated item ready to insert. Images are already hosted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub description: Option<String>,
    pub cover_image_url: String,
    pub detail_image_urls: Vec<String>,
    pub sizes: Vec<ItemSize>,
    pub available: bool,
}

/// Field-level changes for an existing item. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub cover_image_url: Option<String>,
    pub detail_image_urls: Option<Vec<String>>,
    pub sizes: Option<Vec<ItemSize>>,
    pub available: Option<bool>,
}

impl ItemChanges {
    /// Whether applying these changes would leave the item untouched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.cover_image_url.is_none()
            && self.detail_image_urls.is_none()
            && self.sizes.is_none()
            && self.available.is_none()
    }
}

impl Item {
    /// Apply changes in place.
    pub fn apply(&mut self, changes: ItemChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(url) = changes.cover_image_url {
            self.cover_image_url = url;
        }
        if let Some(urls) = changes.detail_image_urls {
            self.detail_image_urls = urls;
        }
        if let Some(sizes) = changes.sizes {
            self.sizes = sizes;
        }
        if let Some(available) = changes.available {
            self.available = available;
        }
    }
}
