//! The cart coordinator.

use std::sync::Arc;

use common::{ProductId, Quantity, UserId};
use domain::api::CartApi;
use domain::models::Cart;
use domain::{Result, SessionStore, StorefrontError};
use tokio::sync::RwLock;

/// How a quantity change is carried out over the delete and add primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuantityUpdatePolicy {
    /// Delete, then add. If the add fails, re-add the original quantity.
    #[default]
    Compensate,
    /// Delete, then add. If the add fails, the item stays out of the cart.
    DeleteThenAdd,
}

/// What the cart display should show.
#[derive(Debug, Clone, PartialEq)]
pub enum CartView {
    /// No session: nothing was fetched.
    SignedOut,
    Loaded(Cart),
}

impl CartView {
    pub fn cart(&self) -> Option<&Cart> {
        match self {
            CartView::SignedOut => None,
            CartView::Loaded(cart) => Some(cart),
        }
    }
}

/// Loads and mutates the signed-in user's cart.
///
/// Every successful mutation is followed by a full reload; the server copy is the
/// only source of cart contents and totals. The cached copy is kept with the user it
/// was fetched for and is never handed to another session.
#[derive(Clone)]
pub struct CartCoordinator {
    api: CartApi,
    session: Arc<SessionStore>,
    policy: QuantityUpdatePolicy,
    current: Arc<RwLock<Option<(UserId, Cart)>>>,
}

impl CartCoordinator {
    pub fn new(api: CartApi, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            policy: QuantityUpdatePolicy::default(),
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_policy(mut self, policy: QuantityUpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> QuantityUpdatePolicy {
        self.policy
    }

    /// The last cart fetched for the signed-in user, if any.
    pub async fn current(&self) -> Option<Cart> {
        let user_id = self.session.current()?.user_id;
        self.cached_for(user_id).await
    }

    async fn cached_for(&self, user_id: UserId) -> Option<Cart> {
        match &*self.current.read().await {
            Some((owner, cart)) if *owner == user_id => Some(cart.clone()),
            _ => None,
        }
    }

    /// Forgets the cached cart.
    pub async fn reset(&self) {
        *self.current.write().await = None;
    }

    /// Fetches the cart. Signed out, this makes no call.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<CartView> {
        let Some(session) = self.session.current() else {
            self.reset().await;
            return Ok(CartView::SignedOut);
        };

        if self.cached_for(session.user_id).await.is_none() {
            self.reset().await;
        }
        let cart = self.api.get(session.user_id).await?;
        tracing::debug!(lines = cart.items.len(), total = %cart.total_amount, "cart loaded");
        *self.current.write().await = Some((session.user_id, cart.clone()));
        Ok(CartView::Loaded(cart))
    }

    /// The signed-in user's cached cart, fetching it first if nothing is cached for
    /// that user.
    pub async fn ensure_loaded(&self) -> Result<Cart> {
        let session = self.session.require("view your cart")?;
        if let Some(cart) = self.cached_for(session.user_id).await {
            return Ok(cart);
        }
        match self.load().await? {
            CartView::Loaded(cart) => Ok(cart),
            CartView::SignedOut => Err(StorefrontError::auth_required("view your cart")),
        }
    }

    /// Adds `quantity` units of a product, then reloads.
    #[tracing::instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId, quantity: Quantity) -> Result<Cart> {
        let session = self.session.require("add items to your cart")?;
        self.api
            .add_item(session.user_id, product_id, quantity)
            .await?;
        metrics::counter!("cart_mutations_total", "op" => "add").increment(1);
        self.reload().await
    }

    /// Changes a line's quantity by deleting the line and adding it back.
    ///
    /// The delete completes before the add starts. Under
    /// [`QuantityUpdatePolicy::Compensate`] a failed add is followed by re-adding the
    /// original quantity; the add's error is returned either way.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Cart> {
        let session = self.session.require("update your cart")?;

        let original = match self.policy {
            QuantityUpdatePolicy::Compensate => {
                let cart = self.reload().await?;
                let line = cart.line(product_id).ok_or_else(|| {
                    StorefrontError::validation("That product is not in your cart.")
                })?;
                Quantity::try_from(i64::from(line.quantity)).ok()
            }
            QuantityUpdatePolicy::DeleteThenAdd => None,
        };

        self.api.remove_item(session.user_id, product_id).await?;
        metrics::counter!("cart_mutations_total", "op" => "remove").increment(1);

        let add_error = match self.api.add_item(session.user_id, product_id, quantity).await {
            Ok(()) => {
                metrics::counter!("cart_mutations_total", "op" => "add").increment(1);
                return self.reload().await;
            }
            Err(e) => e,
        };

        match original {
            Some(original) => {
                match self.api.add_item(session.user_id, product_id, original).await {
                    Ok(()) => {
                        tracing::warn!(
                            %product_id,
                            %original,
                            error = %add_error,
                            "quantity update failed; original quantity restored"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            %product_id,
                            error = %add_error,
                            compensation_error = %e,
                            "quantity update failed and could not be undone; item removed"
                        );
                    }
                }
            }
            None => {
                tracing::warn!(
                    %product_id,
                    error = %add_error,
                    "quantity update failed after delete; item removed"
                );
            }
        }

        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "cart reload after failed update failed");
        }
        Err(add_error)
    }

    /// Removes a line, then reloads.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart> {
        let session = self.session.require("update your cart")?;
        self.api.remove_item(session.user_id, product_id).await?;
        metrics::counter!("cart_mutations_total", "op" => "remove").increment(1);
        self.reload().await
    }

    /// Empties the cart, then reloads.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart> {
        self.empty().await?;
        self.reload().await
    }

    /// Empties the cart on the server without reloading it. The cached copy is
    /// dropped.
    pub async fn empty(&self) -> Result<()> {
        let session = self.session.require("clear your cart")?;
        self.api.clear(session.user_id).await?;
        self.reset().await;
        metrics::counter!("cart_mutations_total", "op" => "clear").increment(1);
        Ok(())
    }

    async fn reload(&self) -> Result<Cart> {
        match self.load().await? {
            CartView::Loaded(cart) => Ok(cart),
            CartView::SignedOut => Err(StorefrontError::auth_required("view your cart")),
        }
    }
}
