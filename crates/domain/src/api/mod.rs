//! Typed clients for the backend services.
//!
//! Each client is a thin mapping from an operation to one gateway request; none of
//! them hold state beyond the shared [`ApiClient`].

mod auth;
mod cart;
mod orders;
mod payments;
mod products;
mod users;

pub use auth::AuthApi;
pub use cart::CartApi;
pub use orders::OrderApi;
pub use payments::PaymentApi;
pub use products::ProductApi;
pub use users::ProfileApi;

use gateway::ApiClient;

/// All backend clients over one shared invoker.
#[derive(Clone)]
pub struct Backend {
    pub auth: AuthApi,
    pub users: ProfileApi,
    pub products: ProductApi,
    pub cart: CartApi,
    pub payments: PaymentApi,
    pub orders: OrderApi,
}

impl Backend {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            users: ProfileApi::new(client.clone()),
            products: ProductApi::new(client.clone()),
            cart: CartApi::new(client.clone()),
            payments: PaymentApi::new(client.clone()),
            orders: OrderApi::new(client),
        }
    }
}
