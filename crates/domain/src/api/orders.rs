use common::{OrderId, UserId};
use gateway::{ApiClient, Request};

use crate::error::Result;
use crate::models::{Order, OrderStatus, PlaceOrderRequest, UpdateOrderStatusRequest};

/// Client for the order service.
#[derive(Clone)]
pub struct OrderApi {
    client: ApiClient,
}

impl OrderApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Creates an order from the user's current server-side cart.
    pub async fn place(&self, user_id: UserId, email: &str) -> Result<Order> {
        let body = PlaceOrderRequest {
            user_id,
            email: email.to_string(),
        };
        let request = Request::post("/api/orders").json(&body)?;
        Ok(self.client.fetch(request).await?)
    }

    pub async fn get(&self, order_id: OrderId) -> Result<Order> {
        Ok(self
            .client
            .fetch(Request::get(format!("/api/orders/{order_id}")))
            .await?)
    }

    /// Lists a user's orders in server order. A response without a body is an empty list.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        match self
            .client
            .invoke(Request::get(format!("/api/orders/user/{user_id}")))
            .await?
        {
            Some(body) => Ok(serde_json::from_value(body)
                .map_err(|e| crate::StorefrontError::Decode(e.to_string()))?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let body = UpdateOrderStatusRequest { status };
        let request = Request::patch(format!("/api/orders/{order_id}/status")).json(&body)?;
        Ok(self.client.fetch(request).await?)
    }

    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        Ok(self
            .client
            .fetch(Request::post(format!("/api/orders/{order_id}/cancel")))
            .await?)
    }
}
