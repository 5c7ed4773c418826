//! Storefront data model and the wire shapes of the backend services.

mod auth;
mod cart;
mod order;
mod payment;
mod product;
mod profile;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use cart::{AddCartItem, Cart, CartLine, RemoveCartItem};
pub use order::{
    Order, OrderLine, OrderStatus, PlaceOrderRequest, UpdateOrderStatusRequest, sort_recent_first,
};
pub use payment::{CardDetails, NormalizedCard, PaymentRequest, PaymentResult, normalize_expiry};
pub use product::{
    DEFAULT_BRAND, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_NAME, Product, ProductDraft,
    StockResponse,
};
pub use profile::{Profile, ProfileUpdate};
