use gateway::{ApiClient, Request};

use crate::error::Result;
use crate::models::{PaymentRequest, PaymentResult};

/// Client for the payment service.
#[derive(Clone)]
pub struct PaymentApi {
    client: ApiClient,
}

impl PaymentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Requests authorization. A decline is a successful call with `approved == false`.
    pub async fn charge(&self, request: &PaymentRequest) -> Result<PaymentResult> {
        let request = Request::post("/api/payments/charge").json(request)?;
        Ok(self.client.fetch(request).await?)
    }
}
