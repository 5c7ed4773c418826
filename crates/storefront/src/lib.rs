//! Storefront client application.
//!
//! [`Storefront`] wires the gateway, session store, catalog, cart, checkout and
//! order components together and owns the shared [`DisplayState`]. Every
//! operation writes its outcome to the display; concurrent flows are not
//! serialized, so the last write wins.

pub mod config;
pub mod display;
pub mod error;
pub mod render;

use std::sync::Arc;

use catalog::{CatalogEngine, CatalogFilter, CatalogSnapshot, CatalogStatus, FilteredView};
use checkout::{
    CartCoordinator, CartView, CheckoutCoordinator, CheckoutFailure, CheckoutReceipt,
    CheckoutRequest, OrderChange, OrderLifecycle, QuantityUpdatePolicy,
};
use common::{ProductId, Quantity};
use domain::models::{Cart, Order, Product, ProductDraft, Profile, ProfileUpdate, RegisterRequest};
use domain::{
    AccountService, Backend, FileSessionStorage, Result, Session, SessionState, SessionStorage,
    SessionStore, StorefrontError,
};
use gateway::{ApiClient, HttpTransport, Transport};
use tokio::sync::{Mutex, RwLock, watch};

use crate::config::Config;
pub use crate::display::{CartDisplay, DisplayState, OrdersDisplay, ProfileDisplay};
use crate::error::AppError;

/// The storefront as one object.
#[derive(Clone)]
pub struct Storefront {
    session: Arc<SessionStore>,
    account: AccountService,
    catalog: CatalogEngine,
    cart: CartCoordinator,
    orders: OrderLifecycle,
    checkout: CheckoutCoordinator,
    display: Arc<RwLock<DisplayState>>,
    session_changes: Arc<Mutex<watch::Receiver<SessionState>>>,
}

impl Storefront {
    /// Connects to the configured gateway and recovers any persisted session.
    pub fn open(config: &Config) -> std::result::Result<Self, AppError> {
        let transport = HttpTransport::new(config.base_url.clone())?;
        let storage = FileSessionStorage::in_dir(&config.state_dir);
        Ok(Self::with_parts(Arc::new(transport), Arc::new(storage), config))
    }

    /// Builds a storefront over explicit transport and session storage.
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        config: &Config,
    ) -> Self {
        Self::with_policy(transport, storage, config, QuantityUpdatePolicy::default())
    }

    pub fn with_policy(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        config: &Config,
        policy: QuantityUpdatePolicy,
    ) -> Self {
        let session = Arc::new(SessionStore::open(storage));
        let client =
            ApiClient::new(transport, session.clone()).with_default_timeout(config.timeout());
        let backend = Backend::new(client);

        let account = AccountService::new(backend.auth, backend.users, session.clone());
        let catalog = CatalogEngine::new(backend.products, session.clone());
        let cart = CartCoordinator::new(backend.cart, session.clone()).with_policy(policy);
        let orders = OrderLifecycle::new(backend.orders.clone(), session.clone());
        let checkout = CheckoutCoordinator::new(
            session.clone(),
            cart.clone(),
            backend.payments,
            backend.orders,
            orders.clone(),
        )
        .with_currency(config.currency.clone());

        let display = DisplayState::for_session(&session.state());
        let session_changes = session.subscribe();
        tracing::info!(
            base_url = %config.base_url,
            signed_in = session.is_authenticated(),
            "storefront ready"
        );

        Self {
            session,
            account,
            catalog,
            cart,
            orders,
            checkout,
            display: Arc::new(RwLock::new(display)),
            session_changes: Arc::new(Mutex::new(session_changes)),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn catalog(&self) -> &CatalogEngine {
        &self.catalog
    }

    pub fn cart(&self) -> &CartCoordinator {
        &self.cart
    }

    pub fn orders(&self) -> &OrderLifecycle {
        &self.orders
    }

    /// The current display, after following any session transition.
    pub async fn display(&self) -> DisplayState {
        self.sync_session().await;
        self.display.read().await.clone()
    }

    async fn sync_session(&self) {
        let mut changes = self.session_changes.lock().await;
        if changes.has_changed().unwrap_or(false) {
            let state = changes.borrow_and_update().clone();
            self.display.write().await.on_session_change(&state);
        }
    }

    /// Follows the session, then records `result` as the latest notice.
    async fn report<T>(&self, result: Result<T>, success: impl FnOnce(&T) -> String) -> Result<T> {
        self.sync_session().await;
        let notice = match &result {
            Ok(value) => success(value),
            Err(e) => e.to_string(),
        };
        self.display.write().await.notice = Some(notice);
        result
    }

    async fn show_cart(&self, cart: &Cart) {
        self.display.write().await.cart = CartDisplay::Cart(cart.clone());
    }

    async fn show_orders(&self, orders: OrdersDisplay) {
        self.display.write().await.orders = orders;
    }
}

// Account
impl Storefront {
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let result = self.account.login(email, password).await;
        let result = self
            .report(result, |s| format!("Signed in as {}.", s.email))
            .await;
        if result.is_ok() {
            self.refresh_cart_display().await;
        }
        result
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Session> {
        let result = self.account.register(request).await;
        let result = self
            .report(result, |s| format!("Welcome, {}.", s.email))
            .await;
        if result.is_ok() {
            self.refresh_cart_display().await;
        }
        result
    }

    /// Signs out and resets the cart, order and profile displays.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.account.sign_out();
        self.cart.reset().await;
        self.orders.reset().await;
        self.report(result, |_| "Signed out.".to_string()).await
    }

    pub async fn profile(&self) -> Result<Profile> {
        let result = self.account.profile().await;
        if let Ok(profile) = &result {
            self.display.write().await.profile = ProfileDisplay::Profile(profile.clone());
        }
        self.report(result, |p| format!("Profile for {}.", p.email))
            .await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile> {
        let result = self.account.update_profile(update).await;
        if let Ok(profile) = &result {
            self.display.write().await.profile = ProfileDisplay::Profile(profile.clone());
        }
        self.report(result, |_| "Profile updated.".to_string())
            .await
    }

    async fn refresh_cart_display(&self) {
        match self.cart.load().await {
            Ok(CartView::Loaded(cart)) => self.show_cart(&cart).await,
            Ok(CartView::SignedOut) => {}
            Err(e) => tracing::warn!(error = %e, "cart refresh after sign-in failed"),
        }
    }
}

// Catalog
impl Storefront {
    /// Reloads the catalog. A failed product list leaves the catalog empty and the
    /// notice reads "Catalog is unavailable." followed by the cause.
    pub async fn load_catalog(&self) -> Result<CatalogSnapshot> {
        let result = self.catalog.load().await;
        let status = self.catalog.status().await;
        let notice = match &result {
            Ok(_) => status.message().to_string(),
            Err(e) => format!("{} {e}", CatalogStatus::Unavailable.message()),
        };
        self.display.write().await.notice = Some(notice);
        result
    }

    pub async fn filter_catalog(&self, filter: &CatalogFilter) -> FilteredView {
        self.catalog.filter(filter).await
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        let result = self.catalog.create_product(draft).await;
        self.report(result, |p| format!("Created {}.", p.display_name()))
            .await
    }

    pub async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        let result = self.catalog.update_product(id, draft).await;
        self.report(result, |p| format!("Updated {}.", p.display_name()))
            .await
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = self.catalog.delete_product(id).await;
        self.report(result, |_| format!("Deleted product {id}."))
            .await
    }
}

// Cart
impl Storefront {
    pub async fn load_cart(&self) -> Result<CartView> {
        let result = self.cart.load().await;
        match &result {
            Ok(CartView::Loaded(cart)) => self.show_cart(cart).await,
            Ok(CartView::SignedOut) => self.display.write().await.cart = CartDisplay::SignIn,
            Err(_) => {}
        }
        self.report(result, |view| match view {
            CartView::SignedOut => "Please sign in to view your cart.".to_string(),
            CartView::Loaded(cart) => format!("{} item(s) in your cart.", cart.unit_count()),
        })
        .await
    }

    /// Adds a product. `quantity` is raw user input and is validated before any call.
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: &str) -> Result<Cart> {
        let result = match Quantity::parse(quantity) {
            Ok(quantity) => self.cart.add(product_id, quantity).await,
            Err(e) => Err(e.into()),
        };
        self.after_cart_mutation(result, "Added to cart.").await
    }

    pub async fn update_cart_quantity(&self, product_id: ProductId, quantity: &str) -> Result<Cart> {
        let result = match Quantity::parse(quantity) {
            Ok(quantity) => self.cart.update_quantity(product_id, quantity).await,
            Err(e) => Err(e.into()),
        };
        self.after_cart_mutation(result, "Cart updated.").await
    }

    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<Cart> {
        let result = self.cart.remove(product_id).await;
        self.after_cart_mutation(result, "Removed from cart.").await
    }

    pub async fn clear_cart(&self) -> Result<Cart> {
        let result = self.cart.clear().await;
        self.after_cart_mutation(result, "Cart cleared.").await
    }

    async fn after_cart_mutation(&self, result: Result<Cart>, success: &str) -> Result<Cart> {
        // A failed mutation may still have reloaded the cart.
        let shown = match &result {
            Ok(cart) => Some(cart.clone()),
            Err(_) => self.cart.current().await,
        };
        if let Some(cart) = shown {
            self.show_cart(&cart).await;
        }
        self.report(result, |_| success.to_string()).await
    }
}

// Checkout
impl Storefront {
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> std::result::Result<CheckoutReceipt, CheckoutFailure> {
        let result = self.checkout.checkout(request).await;
        self.sync_session().await;

        let notice = match &result {
            Ok(receipt) => {
                if let Some(cart) = self.cart.current().await {
                    self.show_cart(&cart).await;
                }
                self.show_orders(OrdersDisplay::List(receipt.orders.clone()))
                    .await;
                format!(
                    "Order #{} placed ({}).",
                    receipt.order.order_id, receipt.order.status
                )
            }
            Err(failure) => match &failure.pending_compensation {
                Some(pending) => format!("{} Follow-up required: {pending}.", failure.error),
                None => failure.error.to_string(),
            },
        };
        self.display.write().await.notice = Some(notice);
        result
    }
}

// Orders
impl Storefront {
    /// Fetches one order. `order_id` is raw user input.
    pub async fn track_order(&self, order_id: &str) -> Result<Order> {
        let result = match self.order_id_input("track orders", order_id) {
            Ok(id) => self.orders.track(id).await,
            Err(e) => Err(e),
        };
        if let Ok(order) = &result {
            self.show_orders(OrdersDisplay::Order(order.clone())).await;
        }
        self.report(result, |o| format!("Order #{} is {}.", o.order_id, o.status))
            .await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let result = self.orders.list().await;
        if let Ok(orders) = &result {
            self.show_orders(OrdersDisplay::List(orders.clone())).await;
        }
        self.report(result, |orders| format!("{} order(s).", orders.len()))
            .await
    }

    pub async fn set_order_status(&self, order_id: &str, status: &str) -> Result<OrderChange> {
        let result = match self.order_id_input("update orders", order_id) {
            Ok(id) => self.orders.set_status(id, status).await,
            Err(e) => Err(e),
        };
        self.after_order_change(result).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<OrderChange> {
        let result = match self.order_id_input("cancel orders", order_id) {
            Ok(id) => self.orders.cancel(id).await,
            Err(e) => Err(e),
        };
        self.after_order_change(result).await
    }

    fn order_id_input(&self, action: &str, raw: &str) -> Result<i64> {
        self.session.require(action)?;
        raw.trim()
            .parse()
            .map_err(|_| StorefrontError::validation("Enter a valid order id."))
    }

    async fn after_order_change(&self, result: Result<OrderChange>) -> Result<OrderChange> {
        if let Ok(change) = &result {
            self.show_orders(OrdersDisplay::Order(change.order.clone()))
                .await;
            if let Ok(orders) = &change.orders {
                self.show_orders(OrdersDisplay::List(orders.clone())).await;
            }
        }
        self.report(result, |change| {
            format!(
                "Order #{} is now {}.",
                change.order.order_id, change.order.status
            )
        })
        .await
    }
}
