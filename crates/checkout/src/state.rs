//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The state of one checkout run.
///
/// State transitions:
/// ```text
/// NotStarted ──► Running ──┬──► Completed
///                          └──► Failed
/// ```
///
/// There is no compensating state: completed steps are never rolled back
/// automatically. A failed run may carry pending compensation instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl CheckoutState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Completed | CheckoutState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::NotStarted => "NotStarted",
            CheckoutState::Running => "Running",
            CheckoutState::Completed => "Completed",
            CheckoutState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
