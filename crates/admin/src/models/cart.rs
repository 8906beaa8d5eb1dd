//! Customer carts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use food_admin_core::{CartId, CartItemId, ItemId, ItemSize, Price};

/// A cart line joined with the current item details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    pub item_id: ItemId,
    pub name: String,
    pub price: Price,
    pub category: String,
    pub image_url: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ItemSize>,
    pub subtotal: Price,
    pub added_at: DateTime<Utc>,
    #[serde(skip)]
    pub available: bool,
}

/// A customer's cart with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    pub user_id: String,
    pub lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(|line| line.subtotal).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Serialize for Cart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Cart", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("items", &self.lines)?;
        state.serialize_field("itemCount", &self.item_count())?;
        state.serialize_field("total", &self.total().to_plain_string())?;
        state.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: u32) -> CartLine {
        let price = Price::parse(price).unwrap();
        CartLine {
            id: CartItemId::generate(),
            item_id: ItemId::generate(),
            name: "Biryani".to_string(),
            price,
            category: "Rice".to_string(),
            image_url: "https://res.cloudinary.com/x/biryani.png".to_string(),
            quantity,
            size: None,
            subtotal: price.times(quantity),
            added_at: Utc::now(),
            available: true,
        }
    }

    #[test]
    fn test_empty_cart_serializes_zero_total() {
        let cart = Cart {
            id: CartId::generate(),
            user_id: "user_1".to_string(),
            lines: Vec::new(),
        };
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["itemCount"], 0);
        assert_eq!(json["total"], "0.00");
        assert_eq!(json["items"], serde_json::json!([]));
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart {
            id: CartId::generate(),
            user_id: "user_1".to_string(),
            lines: vec![line("450", 2), line("120.25", 1)],
        };
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["itemCount"], 2);
        assert_eq!(json["total"], "1020.25");
        assert_eq!(json["items"][0]["subtotal"], 900.0);
        assert!(json["items"][0].get("itemId").is_some());
        assert!(json["items"][0].get("size").is_none());
        assert!(json["items"][0].get("available").is_none());
    }
}
