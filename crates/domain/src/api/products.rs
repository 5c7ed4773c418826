use common::ProductId;
use gateway::{ApiClient, Request};

use crate::error::Result;
use crate::models::{Product, ProductDraft, StockResponse};

/// Client for the catalog service, including its inventory lookup.
#[derive(Clone)]
pub struct ProductApi {
    client: ApiClient,
}

impl ProductApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists every product. A response without a body is an empty catalog.
    pub async fn list(&self) -> Result<Vec<Product>> {
        match self.client.invoke(Request::get("/api/products")).await? {
            Some(body) => Ok(serde_json::from_value(body)
                .map_err(|e| crate::StorefrontError::Decode(e.to_string()))?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, id: ProductId) -> Result<Product> {
        Ok(self
            .client
            .fetch(Request::get(format!("/api/products/{id}")))
            .await?)
    }

    pub async fn stock(&self, id: ProductId) -> Result<StockResponse> {
        Ok(self
            .client
            .fetch(Request::get(format!("/api/products/{id}/stock")))
            .await?)
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<Product> {
        let request = Request::post("/api/products").json(draft)?;
        Ok(self.client.fetch(request).await?)
    }

    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        let request = Request::put(format!("/api/products/{id}")).json(draft)?;
        Ok(self.client.fetch(request).await?)
    }

    pub async fn delete(&self, id: ProductId) -> Result<()> {
        Ok(self
            .client
            .execute(Request::delete(format!("/api/products/{id}")))
            .await?)
    }
}
