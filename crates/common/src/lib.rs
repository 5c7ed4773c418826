//! Shared value types for the storefront client.
//!
//! Every backend service identifies its records with positive 64-bit integers; the
//! newtypes here keep a user id from being passed where an order id is expected.

pub mod ids;
pub mod money;
pub mod quantity;

pub use ids::{IdError, OrderId, ProductId, ProfileId, UserId};
pub use money::Money;
pub use quantity::{Quantity, QuantityError};
