//! Portion sizes offered for menu items.

use serde::{Deserialize, Serialize};

use super::status::UnknownVariant;

/// A portion size. Stored and serialized in canonical capitalised form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ItemSize {
    Small,
    Medium,
    Large,
}

impl ItemSize {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }

    /// Parse a list of sizes, collapsing duplicates and keeping
    /// `Small, Medium, Large` order.
    ///
    /// # Errors
    ///
    /// Returns the first unrecognised entry.
    pub fn parse_list<S: AsRef<str>>(values: &[S]) -> Result<Vec<Self>, UnknownVariant> {
        let mut sizes = values
            .iter()
            .map(|v| v.as_ref().parse())
            .collect::<Result<Vec<Self>, _>>()?;
        sizes.sort_unstable();
        sizes.dedup();
        Ok(sizes)
    }
}

impl std::fmt::Display for ItemSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemSize {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(UnknownVariant {
                kind: "size",
                value: s.to_owned(),
                expected: "Small, Medium, Large",
            }),
        }
    }
}

impl TryFrom<String> for ItemSize {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemSize> for &'static str {
    fn from(size: ItemSize) -> Self {
        size.as_str()
    }
}
