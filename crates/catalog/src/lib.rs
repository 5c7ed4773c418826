//! The storefront catalog.
//!
//! - [`CatalogEngine`] loads products and enriches each with live stock
//! - [`CatalogFilter`] recomputes the visible subset from the full list
//! - [`Facets`] lists the categories and brands present

pub mod engine;
pub mod filter;
pub mod item;

pub use engine::{
    CatalogEngine, CatalogSnapshot, CatalogStatus, FilteredView, LIVE_MESSAGE,
    NO_MATCHES_MESSAGE, UNAVAILABLE_MESSAGE,
};
pub use filter::{CatalogFilter, Facets};
pub use item::{CatalogItem, StockLevel};
