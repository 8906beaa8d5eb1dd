//! Item request bodies and their validation.
//!
//! Validation collects every field error before responding so the admin
//! form can highlight all problems at once.

use serde::{Deserialize, Serialize};

use food_admin_core::{ItemSize, Price, PriceError};

use crate::error::FieldError;
use crate::models::ItemChanges;
use crate::services::images::DataUri;

/// Longest accepted item name.
pub const MAX_NAME_LEN: usize = 120;
/// Longest accepted category.
pub const MAX_CATEGORY_LEN: usize = 60;
/// Longest accepted description.
pub const MAX_DESCRIPTION_LEN: usize = 2000;
/// Most detail images per item.
pub const MAX_DETAIL_IMAGES: usize = 8;

/// Query parameters for `GET /api/items`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub category: Option<String>,
    pub available: Option<bool>,
}

/// A price sent either as a JSON number or a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    fn parse(&self) -> Result<Price, PriceError> {
        match self {
            Self::Number(n) => Price::parse(&n.to_string()),
            Self::Text(s) => Price::parse(s),
        }
    }
}

/// Body of `POST /api/items`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(rename = "Name", alias = "name")]
    pub name: Option<String>,
    pub price: Option<PriceInput>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_base64: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub detail_images_base64: Option<Vec<String>>,
}

/// Body of `PUT /api/items/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(rename = "Name", alias = "name")]
    pub name: Option<String>,
    pub price: Option<PriceInput>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_base64: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub detail_images_base64: Option<Vec<String>>,
    pub available: Option<bool>,
}

/// A validated create request. Images still need uploading.
#[derive(Debug)]
pub struct ItemDraft {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub description: Option<String>,
    pub cover: DataUri,
    pub details: Vec<DataUri>,
    pub sizes: Vec<ItemSize>,
}

/// A validated update. Field changes plus images to upload.
#[derive(Debug, Default)]
pub struct ItemUpdate {
    pub changes: ItemChanges,
    pub cover: Option<DataUri>,
    pub details: Vec<DataUri>,
}

#[derive(Default)]
struct Errors(Vec<FieldError>);

impl Errors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    fn check<T, E: std::fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        result.map_err(|e| self.push(field, e.to_string())).ok()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self.0)
        }
    }
}

fn required_text(errors: &mut Errors, field: &str, value: Option<&str>, max: usize) -> Option<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.push(field, format!("{field} is required"));
        return None;
    }
    text_within(errors, field, value, max)
}

fn text_within(errors: &mut Errors, field: &str, value: &str, max: usize) -> Option<String> {
    if value.chars().count() > max {
        errors.push(field, format!("{field} must be at most {max} characters"));
        return None;
    }
    Some(value.to_string())
}

fn optional_description(errors: &mut Errors, value: &str) -> Option<Option<String>> {
    let value = value.trim();
    if value.is_empty() {
        return Some(None);
    }
    text_within(errors, "description", value, MAX_DESCRIPTION_LEN).map(Some)
}

fn detail_images(errors: &mut Errors, values: &[String], max_bytes: usize) -> Vec<DataUri> {
    if values.len() > MAX_DETAIL_IMAGES {
        errors.push(
            "detailImagesBase64",
            format!("at most {MAX_DETAIL_IMAGES} detail images are allowed"),
        );
        return Vec::new();
    }
    values
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            errors.check(
                &format!("detailImagesBase64[{i}]"),
                DataUri::parse(value, max_bytes),
            )
        })
        .collect()
}

impl CreateItemRequest {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns all field errors found.
    pub fn validate(&self, max_image_bytes: usize) -> Result<ItemDraft, Vec<FieldError>> {
        let mut errors = Errors::default();

        let name = required_text(&mut errors, "Name", self.name.as_deref(), MAX_NAME_LEN);
        let price = match &self.price {
            Some(price) => errors.check("price", price.parse()),
            None => {
                errors.push("price", "price is required");
                None
            }
        };
        let category = required_text(
            &mut errors,
            "category",
            self.category.as_deref(),
            MAX_CATEGORY_LEN,
        );
        let description = self
            .description
            .as_deref()
            .map_or(Some(None), |d| optional_description(&mut errors, d));
        let cover = match self.image_base64.as_deref().map(str::trim) {
            Some(uri) if !uri.is_empty() => {
                errors.check("imageBase64", DataUri::parse(uri, max_image_bytes))
            }
            _ => {
                errors.push("imageBase64", "imageBase64 is required");
                None
            }
        };
        let sizes = errors.check(
            "sizes",
            ItemSize::parse_list(self.sizes.as_deref().unwrap_or_default()),
        );
        let details = detail_images(
            &mut errors,
            self.detail_images_base64.as_deref().unwrap_or_default(),
            max_image_bytes,
        );

        match (name, price, category, description, cover, sizes) {
            (Some(name), Some(price), Some(category), Some(description), Some(cover), Some(sizes)) => {
                errors.finish(|| ItemDraft {
                    name,
                    price,
                    category,
                    description,
                    cover,
                    details,
                    sizes,
                })
            }
            _ => Err(errors.0),
        }
    }
}

impl UpdateItemRequest {
    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns all field errors found.
    pub fn validate(&self, max_image_bytes: usize) -> Result<ItemUpdate, Vec<FieldError>> {
        let mut errors = Errors::default();
        let mut update = ItemUpdate::default();

        if let Some(name) = self.name.as_deref() {
            update.changes.name = required_text(&mut errors, "Name", Some(name), MAX_NAME_LEN);
        }
        if let Some(price) = &self.price {
            update.changes.price = errors.check("price", price.parse());
        }
        if let Some(category) = self.category.as_deref() {
            update.changes.category =
                required_text(&mut errors, "category", Some(category), MAX_CATEGORY_LEN);
        }
        if let Some(description) = self.description.as_deref() {
            update.changes.description = optional_description(&mut errors, description);
        }
        if let Some(uri) = self.image_base64.as_deref() {
            update.cover = errors.check("imageBase64", DataUri::parse(uri, max_image_bytes));
        }
        if let Some(sizes) = &self.sizes {
            update.changes.sizes = errors.check("sizes", ItemSize::parse_list(sizes));
        }
        if let Some(details) = &self.detail_images_base64 {
            update.details = detail_images(&mut errors, details, max_image_bytes);
        }
        update.changes.available = self.available;

        errors.finish(|| update)
    }
}
