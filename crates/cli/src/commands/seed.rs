//! Seed the menu catalog from a YAML file.
//!
//! Images must already be hosted; entries carry their CDN URLs.
//!
//! ```yaml
//! - name: Chicken Karahi
//!   price: 1450
//!   category: Mains
//!   description: Slow cooked in a wok with tomatoes and green chillies
//!   image_url: https://res.cloudinary.com/demo/image/upload/karahi.jpg
//!   detail_image_urls: []
//!   sizes: [Small, Large]
//!   available: true
//! ```
//!
//! Every entry is validated before the database is touched.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use food_admin::db::{ItemRepository, RepositoryError};
use food_admin::models::NewItem;
use food_admin_core::{ItemSize, Price};

use super::{ConnectError, connect};

const MAX_NAME_LEN: usize = 120;

/// Seed command errors.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid catalog:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One catalog entry as written in the seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub name: String,
    /// Number or numeric string.
    pub price: serde_yaml::Value,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub detail_image_urls: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

fn hosted_url(raw: &str) -> Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("{raw:?} is not a URL ({e})"))?;
    match url.scheme() {
        "https" | "http" => Ok(url.into()),
        other => Err(format!("{raw:?} must be an http(s) URL, not {other}")),
    }
}

fn price(value: &serde_yaml::Value) -> Result<Price, String> {
    let text = match value {
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        _ => return Err("price must be a number".to_owned()),
    };
    Price::parse(&text).map_err(|e| e.to_string())
}

impl CatalogEntry {
    fn validate(self) -> Result<NewItem, Vec<String>> {
        let mut problems = Vec::new();

        let name = self.name.trim().to_owned();
        if name.is_empty() {
            problems.push("name is required".to_owned());
        } else if name.chars().count() > MAX_NAME_LEN {
            problems.push(format!("name must be at most {MAX_NAME_LEN} characters"));
        }
        let category = self.category.trim().to_owned();
        if category.is_empty() {
            problems.push("category is required".to_owned());
        }

        let price = price(&self.price).map_err(|e| problems.push(e)).ok();
        let cover = hosted_url(&self.image_url)
            .map_err(|e| problems.push(format!("image_url: {e}")))
            .ok();
        let details: Vec<String> = self
            .detail_image_urls
            .iter()
            .filter_map(|raw| {
                hosted_url(raw)
                    .map_err(|e| problems.push(format!("detail_image_urls: {e}")))
                    .ok()
            })
            .collect();
        let sizes = ItemSize::parse_list(&self.sizes)
            .map_err(|e| problems.push(e.to_string()))
            .ok();

        match (price, cover, sizes) {
            (Some(price), Some(cover_image_url), Some(sizes)) if problems.is_empty() => {
                Ok(NewItem {
                    name,
                    price,
                    category,
                    description: self
                        .description
                        .map(|d| d.trim().to_owned())
                        .filter(|d| !d.is_empty()),
                    cover_image_url,
                    detail_image_urls: details,
                    sizes,
                    available: self.available,
                })
            }
            _ => Err(problems),
        }
    }
}

/// Parse and validate a whole catalog. Problems are reported per entry.
///
/// # Errors
///
/// Returns `SeedError::Yaml` for malformed files and `SeedError::Invalid`
/// listing every problem found.
pub fn parse_catalog(yaml: &str) -> Result<Vec<NewItem>, SeedError> {
    let entries: Vec<CatalogEntry> = serde_yaml::from_str(yaml)?;

    let mut items = Vec::with_capacity(entries.len());
    let mut problems = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let label = format!("#{} ({})", index + 1, entry.name.trim());
        match entry.validate() {
            Ok(item) => items.push(item),
            Err(errors) => problems.extend(errors.into_iter().map(|e| format!("{label}: {e}"))),
        }
    }

    if problems.is_empty() {
        Ok(items)
    } else {
        Err(SeedError::Invalid(problems))
    }
}

/// Seed catalog items from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `clear_existing` - Delete every existing item first (cart lines
///   referencing them cascade)
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or a database
/// operation fails.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    tracing::info!(path = %file_path, "Loading catalog from file");
    let yaml = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: file_path.to_owned(),
        source,
    })?;
    let items = parse_catalog(&yaml)?;
    tracing::info!(count = items.len(), "Catalog validated");

    let pool = connect().await?;
    let repo = ItemRepository::new(&pool);

    if clear_existing {
        let removed = repo.delete_all().await?;
        tracing::warn!(removed, "Cleared existing catalog items");
    }

    for item in &items {
        let created = repo.create(item).await?;
        tracing::info!(id = %created.id, name = %created.name, "Item seeded");
    }

    tracing::info!(count = items.len(), "Catalog seeding complete!");
    Ok(())
}
