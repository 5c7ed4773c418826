//! Checkout step definitions.

use serde::{Deserialize, Serialize};

/// Flow name recorded in the checkout journal.
pub const FLOW_TYPE: &str = "Checkout";

/// The checkout steps, in execution order. Each gates the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    VerifySession,
    LoadCart,
    BuildPayment,
    AuthorizePayment,
    CreateOrder,
    ClearCart,
    RefreshOrders,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 7] = [
        CheckoutStep::VerifySession,
        CheckoutStep::LoadCart,
        CheckoutStep::BuildPayment,
        CheckoutStep::AuthorizePayment,
        CheckoutStep::CreateOrder,
        CheckoutStep::ClearCart,
        CheckoutStep::RefreshOrders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::VerifySession => "verify_session",
            CheckoutStep::LoadCart => "load_cart",
            CheckoutStep::BuildPayment => "build_payment",
            CheckoutStep::AuthorizePayment => "authorize_payment",
            CheckoutStep::CreateOrder => "create_order",
            CheckoutStep::ClearCart => "clear_cart",
            CheckoutStep::RefreshOrders => "refresh_orders",
        }
    }

    /// Whether completing the step changes state on a backend service.
    pub fn has_side_effect(&self) -> bool {
        matches!(
            self,
            CheckoutStep::AuthorizePayment | CheckoutStep::CreateOrder | CheckoutStep::ClearCart
        )
    }

    /// Whether the step's side effect can be undone through a backend endpoint.
    ///
    /// Payment authorization cannot: the payment service has no void operation, so an
    /// approved charge left behind by a later failure is reported as pending
    /// compensation. A created order can be cancelled. A cleared cart is gone.
    pub fn is_reversible(&self) -> bool {
        match self {
            CheckoutStep::CreateOrder => true,
            step => !step.has_side_effect(),
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
