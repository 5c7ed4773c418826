//! The checkout orchestrator.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use common::UserId;
use domain::api::{OrderApi, PaymentApi};
use domain::models::{CardDetails, Cart, Order, PaymentRequest, PaymentResult};
use domain::{SessionStore, StorefrontError};
use thiserror::Error;
use uuid::Uuid;

use crate::cart::CartCoordinator;
use crate::events::{CheckoutEvent, PendingCompensation};
use crate::journal::CheckoutJournal;
use crate::orders::OrderLifecycle;
use crate::steps::CheckoutStep;

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Shopper input for one checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub card: CardDetails,
    /// Contact email for the order; the session email when absent.
    pub email: Option<String>,
}

/// A completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub payment: PaymentResult,
    pub order: Order,
    /// The refreshed order list, most recent first.
    pub orders: Vec<Order>,
    pub journal: CheckoutJournal,
}

/// A checkout that stopped at `step`.
///
/// Steps completed before the failure are not rolled back. `payment` and `order`
/// hold whatever those steps produced, and `pending_compensation` names any
/// side effect that needs manual follow-up.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct CheckoutFailure {
    pub step: CheckoutStep,
    #[source]
    pub error: StorefrontError,
    pub payment: Option<PaymentResult>,
    pub order: Option<Order>,
    pub pending_compensation: Option<PendingCompensation>,
    pub journal: CheckoutJournal,
}

/// In-flight bookkeeping for one run.
struct Run {
    journal: CheckoutJournal,
    reference: Option<String>,
    payment: Option<PaymentResult>,
    order: Option<Order>,
    started: Instant,
}

impl Run {
    fn begin(&mut self, step: CheckoutStep) {
        tracing::info!(step = %step, "checkout step started");
        self.journal.record(CheckoutEvent::step_started(step));
    }

    fn complete(&mut self, step: CheckoutStep) {
        self.journal.record(CheckoutEvent::step_completed(step));
    }

    fn fail(mut self, step: CheckoutStep, error: StorefrontError) -> CheckoutFailure {
        tracing::warn!(step = %step, error = %error, "checkout step failed");
        self.journal
            .record(CheckoutEvent::step_failed(step, error.to_string()));

        let pending_compensation = match (&self.payment, &self.order) {
            (Some(payment), None) if payment.approved => Some(PendingCompensation::VoidPayment {
                payment_id: payment.payment_id.clone(),
                reference: self.reference.clone().unwrap_or_default(),
            }),
            _ => None,
        };
        if let Some(compensation) = &pending_compensation {
            tracing::warn!(%compensation, "approved payment has no order");
            self.journal
                .record(CheckoutEvent::compensation_pending(compensation.clone()));
        }

        self.journal
            .record(CheckoutEvent::checkout_failed(step, error.to_string()));
        metrics::counter!("checkout_failed_total", "step" => step.as_str()).increment(1);
        metrics::histogram!("checkout_duration_seconds")
            .record(self.started.elapsed().as_secs_f64());

        CheckoutFailure {
            step,
            error,
            payment: self.payment,
            order: self.order,
            pending_compensation,
            journal: self.journal,
        }
    }
}

/// Sequences payment authorization and order creation.
#[derive(Clone)]
pub struct CheckoutCoordinator {
    session: Arc<SessionStore>,
    cart: CartCoordinator,
    payments: PaymentApi,
    orders: OrderApi,
    lifecycle: OrderLifecycle,
    currency: String,
}

impl CheckoutCoordinator {
    pub fn new(
        session: Arc<SessionStore>,
        cart: CartCoordinator,
        payments: PaymentApi,
        orders: OrderApi,
        lifecycle: OrderLifecycle,
    ) -> Self {
        Self {
            session,
            cart,
            payments,
            orders,
            lifecycle,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Runs the checkout.
    ///
    /// Steps run strictly in order: verify session and contact email, load a
    /// non-empty cart, build the payment, authorize it, create the order, clear the
    /// cart, refresh the order list. The first failure stops the run. A timeout
    /// stops it the same way a rejection does.
    #[tracing::instrument(skip_all, fields(flow = crate::steps::FLOW_TYPE))]
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutFailure> {
        metrics::counter!("checkout_started_total").increment(1);
        let mut run = Run {
            journal: CheckoutJournal::new(),
            reference: None,
            payment: None,
            order: None,
            started: Instant::now(),
        };

        // 1. Session and contact email
        run.begin(CheckoutStep::VerifySession);
        let session = match self.session.require("check out") {
            Ok(session) => session,
            Err(e) => return Err(run.fail(CheckoutStep::VerifySession, e)),
        };
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .or_else(|| session.contact_email())
            .map(str::to_string);
        let Some(email) = email else {
            return Err(run.fail(
                CheckoutStep::VerifySession,
                StorefrontError::validation("A contact email is required to check out."),
            ));
        };
        run.journal.record(CheckoutEvent::checkout_started(
            Uuid::new_v4(),
            session.user_id,
        ));
        run.complete(CheckoutStep::VerifySession);

        // 2. Cart
        run.begin(CheckoutStep::LoadCart);
        let cart = match self.cart.ensure_loaded().await {
            Ok(cart) if cart.is_empty() => {
                return Err(run.fail(
                    CheckoutStep::LoadCart,
                    StorefrontError::validation("Your cart is empty."),
                ));
            }
            Ok(cart) => cart,
            Err(e) => return Err(run.fail(CheckoutStep::LoadCart, e)),
        };
        run.complete(CheckoutStep::LoadCart);

        // 3. Payment request
        run.begin(CheckoutStep::BuildPayment);
        let built = self.build_payment(&request.card, &cart, &email, session.user_id);
        let payment_request = match built {
            Ok(payment_request) => payment_request,
            Err(e) => return Err(run.fail(CheckoutStep::BuildPayment, e)),
        };
        run.reference = Some(payment_request.reference.clone());
        run.complete(CheckoutStep::BuildPayment);

        // 4. Authorization
        run.begin(CheckoutStep::AuthorizePayment);
        let payment = match self.payments.charge(&payment_request).await {
            Ok(payment) => payment,
            Err(e) => return Err(run.fail(CheckoutStep::AuthorizePayment, e)),
        };
        let approved = payment.approved;
        let reason = payment.decline_reason();
        run.payment = Some(payment.clone());
        if !approved {
            return Err(run.fail(
                CheckoutStep::AuthorizePayment,
                StorefrontError::Declined { reason },
            ));
        }
        run.journal
            .record(CheckoutEvent::payment_authorized(payment.payment_id.clone()));

        // 5. Order
        run.begin(CheckoutStep::CreateOrder);
        let order = match self.orders.place(session.user_id, &email).await {
            Ok(order) => order,
            Err(e) => return Err(run.fail(CheckoutStep::CreateOrder, e)),
        };
        tracing::info!(order_id = %order.order_id, status = %order.status, "order created");
        run.journal.record(CheckoutEvent::order_created(order.order_id));
        run.order = Some(order.clone());

        // 6. Cart is cleared explicitly
        run.begin(CheckoutStep::ClearCart);
        if let Err(e) = self.cart.empty().await {
            return Err(run.fail(CheckoutStep::ClearCart, e));
        }
        run.complete(CheckoutStep::ClearCart);

        // 7. Order list, and the emptied cart
        run.begin(CheckoutStep::RefreshOrders);
        if let Err(e) = self.cart.load().await {
            tracing::warn!(error = %e, "cart reload after checkout failed");
        }
        let orders = match self.lifecycle.list().await {
            Ok(orders) => orders,
            Err(e) => return Err(run.fail(CheckoutStep::RefreshOrders, e)),
        };
        run.complete(CheckoutStep::RefreshOrders);

        run.journal.record(CheckoutEvent::checkout_completed());
        metrics::counter!("checkout_completed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds")
            .record(run.started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.order_id, "checkout completed");

        Ok(CheckoutReceipt {
            payment,
            order,
            orders,
            journal: run.journal,
        })
    }

    fn build_payment(
        &self,
        card: &CardDetails,
        cart: &Cart,
        email: &str,
        user_id: UserId,
    ) -> Result<PaymentRequest, StorefrontError> {
        let card = card.normalize().map_err(StorefrontError::Validation)?;
        if !cart.total_amount.is_positive() {
            return Err(StorefrontError::validation(
                "The cart total must be greater than zero.",
            ));
        }
        let reference = payment_reference(user_id, Utc::now().timestamp_millis());
        Ok(PaymentRequest::new(
            cart.total_amount,
            self.currency.clone(),
            card,
            email,
            reference,
        ))
    }
}

/// Uniqueness reference for a charge: the user id and the time in milliseconds.
pub fn payment_reference(user_id: UserId, millis: i64) -> String {
    format!("{user_id}-{millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_reference() {
        assert_eq!(
            payment_reference(UserId::new(7), 1_700_000_000_000),
            "7-1700000000000"
        );
    }
}
