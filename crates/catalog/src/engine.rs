//! Catalog loading, enrichment and admin mutations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::ProductId;
use domain::api::ProductApi;
use domain::models::{Product, ProductDraft};
use domain::{Result, SessionStore, StorefrontError};
use futures_util::future::join_all;
use tokio::sync::RwLock;

use crate::filter::{CatalogFilter, Facets};
use crate::item::{CatalogItem, StockLevel};

pub const LIVE_MESSAGE: &str = "Catalog live";
pub const UNAVAILABLE_MESSAGE: &str = "Catalog is unavailable.";
pub const NO_MATCHES_MESSAGE: &str = "No products match the selected filters.";

/// Lifecycle of the catalog view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogStatus {
    /// A load is in flight.
    #[default]
    Syncing,
    /// The last load succeeded.
    Live,
    /// The last base product fetch failed; the list is empty.
    Unavailable,
}

impl CatalogStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogStatus::Syncing => "Syncing",
            CatalogStatus::Live => "Live",
            CatalogStatus::Unavailable => "Unavailable",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CatalogStatus::Syncing => "Syncing catalog...",
            CatalogStatus::Live => LIVE_MESSAGE,
            CatalogStatus::Unavailable => UNAVAILABLE_MESSAGE,
        }
    }
}

/// One immutable result of [`CatalogEngine::load`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub items: Vec<CatalogItem>,
    pub facets: Facets,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    fn new(items: Vec<CatalogItem>) -> Self {
        let facets = Facets::from_items(&items);
        Self {
            items,
            facets,
            loaded_at: Some(Utc::now()),
        }
    }

    /// Number of items whose stock could not be determined.
    pub fn unknown_stock_count(&self) -> usize {
        self.items.iter().filter(|i| !i.stock.is_known()).count()
    }
}

/// The visible subset produced by a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub items: Vec<CatalogItem>,
    pub total: usize,
    /// Shown in place of the list when nothing matches.
    pub message: Option<&'static str>,
}

#[derive(Debug, Default)]
struct CatalogState {
    status: CatalogStatus,
    snapshot: CatalogSnapshot,
}

/// Loads the catalog and answers filter queries against the latest snapshot.
#[derive(Clone)]
pub struct CatalogEngine {
    products: ProductApi,
    session: Arc<SessionStore>,
    state: Arc<RwLock<CatalogState>>,
}

impl CatalogEngine {
    pub fn new(products: ProductApi, session: Arc<SessionStore>) -> Self {
        Self {
            products,
            session,
            state: Arc::new(RwLock::new(CatalogState::default())),
        }
    }

    /// Fetches the product list and enriches every product with its stock.
    ///
    /// Stock queries run concurrently and are all awaited before the snapshot is
    /// published. A failed stock query only marks that product's stock unknown. A
    /// failed product list empties the catalog and marks it unavailable.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<CatalogSnapshot> {
        self.state.write().await.status = CatalogStatus::Syncing;

        let products = match self.products.list().await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(error = %e, "catalog unavailable");
                metrics::counter!("catalog_loads_total", "outcome" => "unavailable").increment(1);
                let mut state = self.state.write().await;
                state.status = CatalogStatus::Unavailable;
                state.snapshot = CatalogSnapshot::default();
                return Err(e);
            }
        };

        let items = self.enrich(products).await;
        let snapshot = CatalogSnapshot::new(items);

        tracing::info!(
            products = snapshot.items.len(),
            unknown_stock = snapshot.unknown_stock_count(),
            "catalog loaded"
        );
        metrics::counter!("catalog_loads_total", "outcome" => "live").increment(1);

        let mut state = self.state.write().await;
        state.status = CatalogStatus::Live;
        state.snapshot = snapshot.clone();
        Ok(snapshot)
    }

    async fn enrich(&self, products: Vec<Product>) -> Vec<CatalogItem> {
        let lookups = products.iter().map(|product| self.stock_for(product.id));
        let levels = join_all(lookups).await;

        products
            .into_iter()
            .zip(levels)
            .map(|(product, stock)| CatalogItem::new(product, stock))
            .collect()
    }

    async fn stock_for(&self, product_id: ProductId) -> StockLevel {
        match self.products.stock(product_id).await {
            Ok(stock) => {
                let available = stock.available_quantity.max(0);
                StockLevel::known(u32::try_from(available).unwrap_or(u32::MAX))
            }
            Err(e) => {
                tracing::debug!(%product_id, error = %e, "stock enrichment failed");
                metrics::counter!("catalog_stock_enrichment_failures_total").increment(1);
                StockLevel::unknown(e.to_string())
            }
        }
    }

    pub async fn status(&self) -> CatalogStatus {
        self.state.read().await.status
    }

    /// The latest snapshot. Empty before the first successful load.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn facets(&self) -> Facets {
        self.state.read().await.snapshot.facets.clone()
    }

    /// Applies `filter` to the full current list.
    pub async fn filter(&self, filter: &CatalogFilter) -> FilteredView {
        let state = self.state.read().await;
        let items: Vec<CatalogItem> = filter
            .apply(&state.snapshot.items)
            .into_iter()
            .cloned()
            .collect();

        let message = if state.status == CatalogStatus::Unavailable {
            Some(UNAVAILABLE_MESSAGE)
        } else if items.is_empty() && !state.snapshot.items.is_empty() {
            Some(NO_MATCHES_MESSAGE)
        } else {
            None
        };

        FilteredView {
            total: state.snapshot.items.len(),
            items,
            message,
        }
    }

    /// Creates a product, then reloads the catalog.
    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.session.require("manage products")?;
        draft.validate().map_err(StorefrontError::Validation)?;
        let product = self.products.create(draft).await?;
        self.reload_after_mutation().await;
        Ok(product)
    }

    /// Replaces a product's fields, then reloads the catalog.
    #[tracing::instrument(skip(self, draft))]
    pub async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product> {
        self.session.require("manage products")?;
        draft.validate().map_err(StorefrontError::Validation)?;
        let product = self.products.update(id, draft).await?;
        self.reload_after_mutation().await;
        Ok(product)
    }

    /// Deletes a product, then reloads the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.session.require("manage products")?;
        self.products.delete(id).await?;
        self.reload_after_mutation().await;
        Ok(())
    }

    async fn reload_after_mutation(&self) {
        // The mutation already succeeded; a failed reload shows up as catalog status.
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "catalog reload after mutation failed");
        }
    }
}
