//! Login and registration contracts.

use chrono::{DateTime, Utc};
use common::{ProfileId, UserId};
use serde::{Deserialize, Serialize};

const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_SYMBOLS: &str = "@$!%*#?&";

/// Body of `POST /api/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err("Email and password are required".to_string());
        }
        Ok(())
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

impl RegisterRequest {
    /// Checks the rules the auth service enforces, before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("A valid email is required".to_string());
        }
        if !is_acceptable_password(&self.password) {
            return Err(
                "Password must be at least 8 characters with at least one letter and one digit"
                    .to_string(),
            );
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name are required".to_string());
        }
        Ok(())
    }
}

fn is_acceptable_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LEN
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
}

/// Response of both auth endpoints.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user_id: UserId,
    pub profile_id: ProfileId,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user_id", &self.user_id)
            .field("profile_id", &self.profile_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
