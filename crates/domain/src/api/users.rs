use common::ProfileId;
use gateway::{ApiClient, Request};

use crate::error::Result;
use crate::models::{Profile, ProfileUpdate};

/// Client for the profile service.
#[derive(Clone)]
pub struct ProfileApi {
    client: ApiClient,
}

impl ProfileApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, profile_id: ProfileId) -> Result<Profile> {
        Ok(self
            .client
            .fetch(Request::get(format!("/api/users/{profile_id}")))
            .await?)
    }

    pub async fn update(&self, profile_id: ProfileId, update: &ProfileUpdate) -> Result<Profile> {
        let request = Request::patch(format!("/api/users/{profile_id}")).json(update)?;
        Ok(self.client.fetch(request).await?)
    }
}
