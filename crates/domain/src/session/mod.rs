//! The signed-in identity and its lifecycle.
//!
//! A [`SessionStore`] starts from whatever record survives in [`SessionStorage`],
//! moves to `Authenticated` on login or registration and back to `Anonymous` on
//! sign-out. Every transition is published to subscribers.

mod account;
mod storage;
mod store;

pub use account::AccountService;
pub use storage::{
    FileSessionStorage, InMemorySessionStorage, SESSION_RECORD_NAME, SessionStorage,
    SessionStorageError,
};
pub use store::SessionStore;

use chrono::{DateTime, Utc};
use common::{ProfileId, UserId};
use serde::{Deserialize, Serialize};

use crate::models::AuthResponse;

/// An authenticated identity and its bearer credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Builds a session from an auth response and the contact details used to obtain it.
    pub fn from_auth(response: AuthResponse, email: &str, phone: Option<String>) -> Self {
        Self {
            token: response.access_token,
            user_id: response.user_id,
            profile_id: response.profile_id,
            email: email.trim().to_string(),
            phone,
            expires_at: response.expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Contact email, if one is on file.
    pub fn contact_email(&self) -> Option<&str> {
        Some(self.email.trim()).filter(|email| !email.is_empty())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("profile_id", &self.profile_id)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated(session) => Some(session),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Actions available in this state.
    pub fn affordances(&self) -> Affordances {
        let signed_in = self.is_authenticated();
        Affordances {
            sign_in: !signed_in,
            sign_out: signed_in,
            cart: signed_in,
            checkout: signed_in,
            orders: signed_in,
            profile: signed_in,
            manage_products: signed_in,
        }
    }
}

/// Which actions a front end should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Affordances {
    pub sign_in: bool,
    pub sign_out: bool,
    pub cart: bool,
    pub checkout: bool,
    pub orders: bool,
    pub profile: bool,
    pub manage_products: bool,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    pub(crate) fn sample_session() -> Session {
        Session {
            token: "tok-123".to_string(),
            user_id: UserId::new(7),
            profile_id: ProfileId::new(9),
            email: "a@b.com".to_string(),
            phone: Some("555-0100".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", sample_session());
        assert!(!rendered.contains("tok-123"));
        assert!(rendered.contains("a@b.com"));
    }

    #[test]
    fn test_affordances_follow_state() {
        let anonymous = SessionState::Anonymous.affordances();
        assert!(anonymous.sign_in);
        assert!(!anonymous.cart && !anonymous.checkout && !anonymous.orders);

        let signed_in = SessionState::Authenticated(sample_session()).affordances();
        assert!(!signed_in.sign_in);
        assert!(signed_in.sign_out && signed_in.checkout && signed_in.manage_products);
    }

    #[test]
    fn test_expiry() {
        let session = sample_session();
        assert!(!session.is_expired(Utc::now()));
        assert!(session.is_expired(session.expires_at));
    }
}
