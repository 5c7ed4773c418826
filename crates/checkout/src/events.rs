//! Checkout journal events.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::steps::CheckoutStep;

/// A side effect left behind by a failed checkout that needs follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingCompensation {
    /// An approved charge with no order to show for it. `reference` is the
    /// reference sent with the charge and identifies it when the payment service
    /// returned no id.
    VoidPayment {
        payment_id: Option<String>,
        reference: String,
    },
}

impl std::fmt::Display for PendingCompensation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingCompensation::VoidPayment {
                payment_id: Some(payment_id),
                ..
            } => write!(f, "void payment {payment_id}"),
            PendingCompensation::VoidPayment {
                payment_id: None,
                reference,
            } => write!(f, "void payment with reference {reference}"),
        }
    }
}

/// Events recorded during a checkout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CheckoutEvent {
    CheckoutStarted(CheckoutStartedData),
    StepStarted(StepData),
    StepCompleted(StepCompletedData),
    StepFailed(StepFailedData),
    /// A completed side effect could not be undone automatically.
    CompensationPending(PendingCompensation),
    CheckoutCompleted(CheckoutFinishedData),
    CheckoutFailed(CheckoutFailedData),
}

impl CheckoutEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CheckoutEvent::CheckoutStarted(_) => "CheckoutStarted",
            CheckoutEvent::StepStarted(_) => "StepStarted",
            CheckoutEvent::StepCompleted(_) => "StepCompleted",
            CheckoutEvent::StepFailed(_) => "StepFailed",
            CheckoutEvent::CompensationPending(_) => "CompensationPending",
            CheckoutEvent::CheckoutCompleted(_) => "CheckoutCompleted",
            CheckoutEvent::CheckoutFailed(_) => "CheckoutFailed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutStartedData {
    pub checkout_id: Uuid,
    pub user_id: UserId,
    pub flow_type: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    pub step: CheckoutStep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCompletedData {
    pub step: CheckoutStep,
    /// Set after payment authorization.
    pub payment_id: Option<String>,
    /// Set after order creation.
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailedData {
    pub step: CheckoutStep,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutFinishedData {
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutFailedData {
    pub step: CheckoutStep,
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl CheckoutEvent {
    pub fn checkout_started(checkout_id: Uuid, user_id: UserId) -> Self {
        CheckoutEvent::CheckoutStarted(CheckoutStartedData {
            checkout_id,
            user_id,
            flow_type: crate::steps::FLOW_TYPE.to_string(),
            started_at: Utc::now(),
        })
    }

    pub fn step_started(step: CheckoutStep) -> Self {
        CheckoutEvent::StepStarted(StepData { step })
    }

    pub fn step_completed(step: CheckoutStep) -> Self {
        CheckoutEvent::StepCompleted(StepCompletedData {
            step,
            payment_id: None,
            order_id: None,
        })
    }

    pub fn payment_authorized(payment_id: Option<String>) -> Self {
        CheckoutEvent::StepCompleted(StepCompletedData {
            step: CheckoutStep::AuthorizePayment,
            payment_id,
            order_id: None,
        })
    }

    pub fn order_created(order_id: OrderId) -> Self {
        CheckoutEvent::StepCompleted(StepCompletedData {
            step: CheckoutStep::CreateOrder,
            payment_id: None,
            order_id: Some(order_id),
        })
    }

    pub fn step_failed(step: CheckoutStep, error: impl Into<String>) -> Self {
        CheckoutEvent::StepFailed(StepFailedData {
            step,
            error: error.into(),
        })
    }

    pub fn compensation_pending(compensation: PendingCompensation) -> Self {
        CheckoutEvent::CompensationPending(compensation)
    }

    pub fn checkout_completed() -> Self {
        CheckoutEvent::CheckoutCompleted(CheckoutFinishedData {
            finished_at: Utc::now(),
        })
    }

    pub fn checkout_failed(step: CheckoutStep, reason: impl Into<String>) -> Self {
        CheckoutEvent::CheckoutFailed(CheckoutFailedData {
            step,
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}
