//! The per-run checkout journal.

use common::{OrderId, UserId};
use serde::Serialize;
use uuid::Uuid;

use crate::events::{CheckoutEvent, PendingCompensation};
use crate::state::CheckoutState;
use crate::steps::CheckoutStep;

/// Record of one checkout run.
///
/// State is derived by applying events in order, so the journal doubles as an
/// audit trail of which steps ran, which completed and what is left to undo.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckoutJournal {
    checkout_id: Option<Uuid>,
    user_id: Option<UserId>,
    state: CheckoutState,
    current_step: Option<CheckoutStep>,
    completed_steps: Vec<CheckoutStep>,
    payment_id: Option<String>,
    order_id: Option<OrderId>,
    failure: Option<(CheckoutStep, String)>,
    pending: Vec<PendingCompensation>,
    events: Vec<CheckoutEvent>,
}

impl CheckoutJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `event` and keeps it.
    pub fn record(&mut self, event: CheckoutEvent) {
        self.apply(&event);
        self.events.push(event);
    }

    fn apply(&mut self, event: &CheckoutEvent) {
        match event {
            CheckoutEvent::CheckoutStarted(data) => {
                self.checkout_id = Some(data.checkout_id);
                self.user_id = Some(data.user_id);
                self.state = CheckoutState::Running;
            }
            CheckoutEvent::StepStarted(data) => {
                self.current_step = Some(data.step);
            }
            CheckoutEvent::StepCompleted(data) => {
                self.completed_steps.push(data.step);
                if let Some(payment_id) = &data.payment_id {
                    self.payment_id = Some(payment_id.clone());
                }
                if let Some(order_id) = data.order_id {
                    self.order_id = Some(order_id);
                }
            }
            CheckoutEvent::StepFailed(data) => {
                self.failure = Some((data.step, data.error.clone()));
            }
            CheckoutEvent::CompensationPending(compensation) => {
                self.pending.push(compensation.clone());
            }
            CheckoutEvent::CheckoutCompleted(_) => {
                self.state = CheckoutState::Completed;
                self.current_step = None;
            }
            CheckoutEvent::CheckoutFailed(data) => {
                self.state = CheckoutState::Failed;
                if self.failure.is_none() {
                    self.failure = Some((data.step, data.reason.clone()));
                }
            }
        }
    }
}

// Query methods
impl CheckoutJournal {
    pub fn checkout_id(&self) -> Option<Uuid> {
        self.checkout_id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// The step running, or the one that failed.
    pub fn current_step(&self) -> Option<CheckoutStep> {
        self.current_step
    }

    pub fn completed_steps(&self) -> &[CheckoutStep] {
        &self.completed_steps
    }

    pub fn has_completed(&self, step: CheckoutStep) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id.as_deref()
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// The failed step and its message.
    pub fn failure(&self) -> Option<(CheckoutStep, &str)> {
        self.failure
            .as_ref()
            .map(|(step, message)| (*step, message.as_str()))
    }

    pub fn pending_compensation(&self) -> &[PendingCompensation] {
        &self.pending
    }

    /// Completed steps whose effects remain on a backend and cannot be undone.
    pub fn irreversible_effects(&self) -> Vec<CheckoutStep> {
        self.completed_steps
            .iter()
            .copied()
            .filter(|step| step.has_side_effect() && !step.is_reversible())
            .collect()
    }

    pub fn events(&self) -> &[CheckoutEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> CheckoutJournal {
        let mut journal = CheckoutJournal::new();
        journal.record(CheckoutEvent::checkout_started(
            Uuid::new_v4(),
            UserId::new(7),
        ));
        journal
    }

    #[test]
    fn test_default_journal() {
        let journal = CheckoutJournal::new();
        assert_eq!(journal.state(), CheckoutState::NotStarted);
        assert!(journal.checkout_id().is_none());
        assert!(journal.events().is_empty());
    }

    #[test]
    fn test_step_lifecycle() {
        let mut journal = started();
        assert_eq!(journal.state(), CheckoutState::Running);
        assert_eq!(journal.user_id(), Some(UserId::new(7)));

        journal.record(CheckoutEvent::step_started(CheckoutStep::AuthorizePayment));
        assert_eq!(journal.current_step(), Some(CheckoutStep::AuthorizePayment));

        journal.record(CheckoutEvent::payment_authorized(Some("pay-1".to_string())));
        journal.record(CheckoutEvent::step_started(CheckoutStep::CreateOrder));
        journal.record(CheckoutEvent::order_created(OrderId::new(42)));
        journal.record(CheckoutEvent::checkout_completed());

        assert_eq!(journal.state(), CheckoutState::Completed);
        assert_eq!(journal.payment_id(), Some("pay-1"));
        assert_eq!(journal.order_id(), Some(OrderId::new(42)));
        assert!(journal.has_completed(CheckoutStep::CreateOrder));
        assert_eq!(journal.current_step(), None);
        assert_eq!(journal.events().len(), 6);
    }

    #[test]
    fn test_failure_with_pending_compensation() {
        let mut journal = started();
        journal.record(CheckoutEvent::payment_authorized(Some("pay-1".to_string())));
        journal.record(CheckoutEvent::step_started(CheckoutStep::CreateOrder));
        journal.record(CheckoutEvent::step_failed(CheckoutStep::CreateOrder, "out of stock"));
        journal.record(CheckoutEvent::compensation_pending(
            PendingCompensation::VoidPayment {
                payment_id: Some("pay-1".to_string()),
                reference: "7-1".to_string(),
            },
        ));
        journal.record(CheckoutEvent::checkout_failed(
            CheckoutStep::CreateOrder,
            "out of stock",
        ));

        assert_eq!(journal.state(), CheckoutState::Failed);
        assert_eq!(
            journal.failure(),
            Some((CheckoutStep::CreateOrder, "out of stock"))
        );
        assert_eq!(journal.current_step(), Some(CheckoutStep::CreateOrder));
        assert_eq!(journal.pending_compensation().len(), 1);
        assert_eq!(
            journal.irreversible_effects(),
            vec![CheckoutStep::AuthorizePayment]
        );
    }
}
