use std::sync::Arc;

use crate::api::{AuthApi, ProfileApi};
use crate::error::{Result, StorefrontError};
use crate::models::{LoginRequest, Profile, ProfileUpdate, RegisterRequest};

use super::{Session, SessionStore};

/// Sign-in, registration and profile flows.
#[derive(Clone)]
pub struct AccountService {
    auth: AuthApi,
    users: ProfileApi,
    session: Arc<SessionStore>,
}

impl AccountService {
    pub fn new(auth: AuthApi, users: ProfileApi, session: Arc<SessionStore>) -> Self {
        Self {
            auth,
            users,
            session,
        }
    }

    /// Signs in and establishes the returned session.
    ///
    /// The profile is then fetched to fill in contact details; that refresh is
    /// best-effort and never fails the login.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = LoginRequest::new(email, password);
        request.validate().map_err(StorefrontError::Validation)?;

        let response = self.auth.login(&request).await?;
        let session = Session::from_auth(response, &request.email, None);
        self.establish(session);

        if let Err(e) = self.profile().await {
            tracing::warn!(error = %e, "profile refresh after login failed");
        }
        self.session.require("continue")
    }

    /// Creates an account and signs in with it.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<Session> {
        request.validate().map_err(StorefrontError::Validation)?;
        let request = RegisterRequest {
            email: request.email.trim().to_string(),
            phone: request
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            ..request
        };

        let response = self.auth.register(&request).await?;
        let session = Session::from_auth(response, &request.email, request.phone.clone());
        self.establish(session.clone());
        Ok(session)
    }

    /// Signs out. Always ends anonymous, even if the record cannot be removed.
    pub fn sign_out(&self) -> Result<()> {
        self.session.clear()?;
        Ok(())
    }

    /// Fetches the signed-in user's profile and refreshes the session contact fields.
    pub async fn profile(&self) -> Result<Profile> {
        let session = self.session.require("view your profile")?;
        let profile = self.users.get(session.profile_id).await?;
        self.refresh_contact(&profile);
        Ok(profile)
    }

    /// Applies `update` to the signed-in user's profile.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile> {
        let session = self.session.require("update your profile")?;
        if update.is_empty() {
            return Err(StorefrontError::validation("Nothing to update"));
        }
        if let Some(email) = update.email.as_deref()
            && !email.contains('@')
        {
            return Err(StorefrontError::validation("A valid email is required"));
        }

        let profile = self.users.update(session.profile_id, &update).await?;
        self.refresh_contact(&profile);
        Ok(profile)
    }

    fn establish(&self, session: Session) {
        if let Err(e) = self.session.establish(session) {
            // Signed in for this run only.
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    fn refresh_contact(&self, profile: &Profile) {
        if let Err(e) = self
            .session
            .update_contact(Some(&profile.email), profile.phone.as_deref())
        {
            tracing::warn!(error = %e, "failed to persist refreshed contact details");
        }
    }
}
