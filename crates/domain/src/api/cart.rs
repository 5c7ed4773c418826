use common::{ProductId, Quantity, UserId};
use gateway::{ApiClient, Request};

use crate::error::Result;
use crate::models::{AddCartItem, Cart, RemoveCartItem};

/// Client for the cart service.
///
/// Mutation responses are discarded: callers re-fetch the cart after every write.
#[derive(Clone)]
pub struct CartApi {
    client: ApiClient,
}

impl CartApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, user_id: UserId) -> Result<Cart> {
        Ok(self
            .client
            .fetch(Request::get(format!("/api/cart/{user_id}")))
            .await?)
    }

    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<()> {
        let body = AddCartItem {
            user_id,
            product_id,
            quantity,
        };
        let request = Request::post("/api/cart/items").json(&body)?;
        Ok(self.client.execute(request).await?)
    }

    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<()> {
        let body = RemoveCartItem {
            user_id,
            product_id,
        };
        let request = Request::delete("/api/cart/items").json(&body)?;
        Ok(self.client.execute(request).await?)
    }

    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        Ok(self
            .client
            .execute(Request::delete(format!("/api/cart/{user_id}")))
            .await?)
    }
}
