//! The server-authoritative cart.

use common::{Money, ProductId, Quantity, UserId};
use serde::{Deserialize, Serialize};

/// One line of a cart, as computed by the cart service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A cart snapshot. Totals come from the server and are never recomputed locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub total_amount: Money,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finds the line for `product_id`.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Body of `POST /api/cart/items`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Body of `DELETE /api/cart/items`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_decodes_server_totals() {
        let cart: Cart = serde_json::from_value(json!({
            "userId": 7,
            "items": [
                { "productId": 1, "productName": "Mug", "quantity": 2, "unitPrice": 4.5, "lineTotal": 9.0 },
                { "productId": 2, "productName": "Tea", "quantity": 1, "unitPrice": 3.25, "lineTotal": 3.25 }
            ],
            "totalAmount": 12.25
        }))
        .unwrap();

        assert_eq!(cart.total_amount, Money::from_cents(1225));
        assert_eq!(cart.unit_count(), 3);
        assert_eq!(cart.line(ProductId::new(2)).unwrap().quantity, 1);
        assert!(cart.line(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_empty_body_fields_default() {
        let cart: Cart = serde_json::from_value(json!({})).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_amount, Money::zero());
    }
}
