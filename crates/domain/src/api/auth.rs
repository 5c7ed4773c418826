use gateway::{ApiClient, Request};

use crate::error::Result;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};

/// Client for the auth service.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let request = Request::post("/api/auth/login").json(request)?;
        Ok(self.client.fetch(request).await?)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let request = Request::post("/api/auth/register").json(request)?;
        Ok(self.client.fetch(request).await?)
    }
}
