//! The order lifecycle manager.

use std::sync::Arc;

use common::{OrderId, UserId};
use domain::api::OrderApi;
use domain::models::{Order, OrderStatus, sort_recent_first};
use domain::{Result, SessionStore, StorefrontError};
use tokio::sync::RwLock;

/// Result of a status change or cancellation.
#[derive(Debug)]
pub struct OrderChange {
    /// The order exactly as the server returned it.
    pub order: Order,
    /// The list refresh that follows the mutation.
    pub orders: Result<Vec<Order>>,
}

/// Fetches, lists and mutates orders. Displays always reflect server responses.
#[derive(Clone)]
pub struct OrderLifecycle {
    api: OrderApi,
    session: Arc<SessionStore>,
    listed: Arc<RwLock<Option<(UserId, Vec<Order>)>>>,
}

/// Validates a raw order id before anything is sent.
pub fn parse_order_id(raw: i64) -> Result<OrderId> {
    OrderId::try_from(raw).map_err(|_| StorefrontError::validation("Enter a valid order id."))
}

impl OrderLifecycle {
    pub fn new(api: OrderApi, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            listed: Arc::new(RwLock::new(None)),
        }
    }

    /// The signed-in user's last listed orders, most recent first.
    pub async fn listed(&self) -> Vec<Order> {
        let Some(session) = self.session.current() else {
            return Vec::new();
        };
        match &*self.listed.read().await {
            Some((owner, orders)) if *owner == session.user_id => orders.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn reset(&self) {
        *self.listed.write().await = None;
    }

    /// Fetches one order.
    #[tracing::instrument(skip(self))]
    pub async fn track(&self, order_id: i64) -> Result<Order> {
        self.session.require("track orders")?;
        let order_id = parse_order_id(order_id)?;
        self.api.get(order_id).await
    }

    /// Fetches the signed-in user's orders, most recent first.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>> {
        let session = self.session.require("view your orders")?;
        let mut orders = self.api.list_for_user(session.user_id).await?;
        sort_recent_first(&mut orders);
        *self.listed.write().await = Some((session.user_id, orders.clone()));
        Ok(orders)
    }

    /// Sets an order's status, then refreshes the list.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(&self, order_id: i64, status: &str) -> Result<OrderChange> {
        self.session.require("update orders")?;
        let order_id = parse_order_id(order_id)?;
        let status = status.trim();
        if status.is_empty() {
            return Err(StorefrontError::validation("Choose a status."));
        }

        let order = self
            .api
            .set_status(order_id, OrderStatus::new(status))
            .await?;
        tracing::info!(%order_id, status = %order.status, "order status updated");
        Ok(self.after_mutation(order).await)
    }

    /// Cancels an order, then refreshes the list.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, order_id: i64) -> Result<OrderChange> {
        self.session.require("cancel orders")?;
        let order_id = parse_order_id(order_id)?;

        let order = self.api.cancel(order_id).await?;
        tracing::info!(%order_id, status = %order.status, "order cancelled");
        Ok(self.after_mutation(order).await)
    }

    async fn after_mutation(&self, order: Order) -> OrderChange {
        let orders = self.list().await;
        if let Err(e) = &orders {
            tracing::warn!(error = %e, "order list refresh failed");
        }
        OrderChange { order, orders }
    }
}
