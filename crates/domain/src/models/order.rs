//! Orders as reported by the order service.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Order status string, owned by the order service.
///
/// Kept opaque: unknown values round-trip untouched and transition legality is
/// decided by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    pub const PLACED: &'static str = "PLACED";
    pub const CANCELLING: &'static str = "CANCELLING";
    pub const PROCESSING: &'static str = "PROCESSING";
    pub const SHIPPED: &'static str = "SHIPPED";
    pub const DELIVERED: &'static str = "DELIVERED";
    pub const CANCELLED: &'static str = "CANCELLED";

    const KNOWN: [&'static str; 6] = [
        Self::PLACED,
        Self::CANCELLING,
        Self::PROCESSING,
        Self::SHIPPED,
        Self::DELIVERED,
        Self::CANCELLED,
    ];

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the status is one the order service is known to emit.
    pub fn is_known(&self) -> bool {
        Self::KNOWN
            .iter()
            .any(|known| known.eq_ignore_ascii_case(&self.0))
    }

    /// Statuses offered when editing an order.
    pub fn known() -> impl Iterator<Item = OrderStatus> {
        Self::KNOWN.into_iter().map(OrderStatus::new)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderStatus {
    fn from(status: &str) -> Self {
        Self::new(status)
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
}

/// Canonical order state returned by every order endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    pub email: String,
}

/// Body of `PATCH /api/orders/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Sorts orders most recent first.
pub fn sort_recent_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.order_id.cmp(&a.order_id));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unknown_status_round_trips() {
        let order: Order = serde_json::from_value(json!({
            "orderId": 5,
            "status": "created",
            "totalAmount": 10.0
        }))
        .unwrap();

        assert_eq!(order.status.as_str(), "created");
        assert!(!order.status.is_known());
        assert!(order.items.is_empty());
        assert_eq!(serde_json::to_value(&order.status).unwrap(), json!("created"));
    }

    #[test]
    fn test_known_statuses() {
        assert!(OrderStatus::new("SHIPPED").is_known());
        assert!(OrderStatus::new("cancelled").is_known());
        assert_eq!(OrderStatus::known().count(), 6);
    }

    #[test]
    fn test_sort_recent_first() {
        let order = |id| Order {
            order_id: OrderId::new(id),
            status: OrderStatus::new(OrderStatus::PLACED),
            total_amount: Money::zero(),
            created_at: None,
            items: Vec::new(),
        };
        let mut orders = vec![order(3), order(5), order(4)];
        sort_recent_first(&mut orders);

        let ids: Vec<i64> = orders.iter().map(|o| o.order_id.get()).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }
}
