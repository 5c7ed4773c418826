//! Cart, checkout and order flows.
//!
//! - [`CartCoordinator`] keeps the cart in step with the cart service
//! - [`CheckoutCoordinator`] runs the seven checkout steps and journals each one
//! - [`OrderLifecycle`] tracks, lists, updates and cancels orders
//!
//! Completed checkout steps are never rolled back automatically. An approved
//! payment stranded by a later failure is reported as
//! [`PendingCompensation::VoidPayment`].

pub mod cart;
pub mod coordinator;
pub mod events;
pub mod journal;
pub mod orders;
pub mod state;
pub mod steps;

pub use cart::{CartCoordinator, CartView, QuantityUpdatePolicy};
pub use coordinator::{
    CheckoutCoordinator, CheckoutFailure, CheckoutReceipt, CheckoutRequest, DEFAULT_CURRENCY,
    payment_reference,
};
pub use events::{CheckoutEvent, PendingCompensation};
pub use journal::CheckoutJournal;
pub use orders::{OrderChange, OrderLifecycle, parse_order_id};
pub use state::CheckoutState;
pub use steps::CheckoutStep;
