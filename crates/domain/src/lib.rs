//! Storefront domain layer.
//!
//! This crate holds everything the storefront flows share:
//!
//! - [`models`]: products, carts, orders, payments and profiles in their wire form
//! - [`api`]: one typed client per backend service, built on the gateway invoker
//! - [`session`]: the session store, its durable record and the account flows
//! - [`error`]: the user-facing error taxonomy

pub mod api;
pub mod error;
pub mod models;
pub mod session;

pub use api::Backend;
pub use error::{ErrorKind, Result, StorefrontError};
pub use session::{
    AccountService, Affordances, FileSessionStorage, InMemorySessionStorage, Session,
    SessionState, SessionStorage, SessionStorageError, SessionStore,
};
