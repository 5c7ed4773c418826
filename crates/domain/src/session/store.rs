use std::sync::Arc;

use chrono::{DateTime, Utc};
use gateway::CredentialSource;
use tokio::sync::watch;

use super::storage::{SessionStorage, SessionStorageError};
use super::{Session, SessionState};
use crate::error::{Result, StorefrontError};

/// Owns the single active session.
///
/// The only writer of session state. Other components read it through
/// [`current`](Self::current), [`require`](Self::require) or a
/// [`subscribe`](Self::subscribe) receiver.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Recovers the persisted session, if any.
    ///
    /// Never fails: an unreadable, corrupt or expired record yields `Anonymous`.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        Self::open_at(storage, Utc::now())
    }

    /// Like [`open`](Self::open), judging expiry against `now`.
    pub fn open_at(storage: Arc<dyn SessionStorage>, now: DateTime<Utc>) -> Self {
        let initial = match recover(storage.as_ref(), now) {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, "recovered session");
                SessionState::Authenticated(session)
            }
            None => SessionState::Anonymous,
        };
        let (state, _) = watch::channel(initial);
        Self { storage, state }
    }

    /// Makes `session` the active session and persists it.
    ///
    /// The in-memory transition happens even when persisting fails; the error is
    /// returned so the caller can report that the session will not survive a restart.
    pub fn establish(&self, session: Session) -> std::result::Result<(), SessionStorageError> {
        let user_id = session.user_id;
        let persisted = self.persist(&session);
        self.state.send_replace(SessionState::Authenticated(session));
        tracing::info!(%user_id, "session established");
        persisted
    }

    /// Signs out: drops the active session and its persisted record.
    pub fn clear(&self) -> std::result::Result<(), SessionStorageError> {
        let previous = self.state.send_replace(SessionState::Anonymous);
        if let Some(session) = previous.session() {
            tracing::info!(user_id = %session.user_id, "session cleared");
        }
        self.storage.remove()
    }

    /// Returns the active session or refuses `action`.
    ///
    /// An expired session is cleared and treated as absent.
    pub fn require(&self, action: &str) -> Result<Session> {
        match self.current() {
            Some(session) if !session.is_expired(Utc::now()) => Ok(session),
            Some(_) => {
                tracing::info!("session expired");
                if let Err(e) = self.clear() {
                    tracing::warn!(error = %e, "failed to remove expired session record");
                }
                Err(StorefrontError::auth_required(action))
            }
            None => Err(StorefrontError::auth_required(action)),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Returns a receiver that observes every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Refreshes the contact fields of the active session from profile data.
    ///
    /// Does nothing when signed out. Returns whether anything changed.
    pub fn update_contact(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> std::result::Result<bool, SessionStorageError> {
        let mut updated = None;
        self.state.send_if_modified(|state| {
            let SessionState::Authenticated(session) = state else {
                return false;
            };
            let mut changed = false;
            if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty())
                && session.email != email
            {
                session.email = email.to_string();
                changed = true;
            }
            if let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty())
                && session.phone.as_deref() != Some(phone)
            {
                session.phone = Some(phone.to_string());
                changed = true;
            }
            if changed {
                updated = Some(session.clone());
            }
            changed
        });

        match updated {
            Some(session) => self.persist(&session).map(|()| true),
            None => Ok(false),
        }
    }

    fn persist(&self, session: &Session) -> std::result::Result<(), SessionStorageError> {
        let record = serde_json::to_string(session)?;
        self.storage.save(&record)
    }
}

impl CredentialSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.state.borrow().session().map(|s| s.token.clone())
    }
}

fn recover(storage: &dyn SessionStorage, now: DateTime<Utc>) -> Option<Session> {
    let record = match storage.load() {
        Ok(record) => record?,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session record");
            return None;
        }
    };

    let session = match serde_json::from_str::<Session>(&record) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "discarding corrupt session record");
            discard(storage);
            return None;
        }
    };

    if session.is_expired(now) {
        tracing::info!(user_id = %session.user_id, "discarding expired session record");
        discard(storage);
        return None;
    }

    Some(session)
}

fn discard(storage: &dyn SessionStorage) {
    if let Err(e) = storage.remove() {
        tracing::warn!(error = %e, "failed to remove session record");
    }
}
