//! Products paired with their stock enrichment.

use domain::models::Product;
use serde::Serialize;

const STOCK_BAR_FLOOR: u32 = 6;
const STOCK_BAR_CEILING: u32 = 120;
const STOCK_BAR_UNKNOWN_PERCENT: f64 = 40.0;

/// Result of the per-product stock query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum StockLevel {
    /// Units available according to the inventory service.
    Known { available: u32 },
    /// The query failed or was never run; `reason` says why.
    Unknown { reason: String },
}

impl StockLevel {
    pub fn known(available: u32) -> Self {
        StockLevel::Known { available }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        StockLevel::Unknown {
            reason: reason.into(),
        }
    }

    /// Available units, or `None` when unknown.
    pub fn available(&self) -> Option<u32> {
        match self {
            StockLevel::Known { available } => Some(*available),
            StockLevel::Unknown { .. } => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, StockLevel::Known { .. })
    }

    /// The count, or `n/a`.
    pub fn label(&self) -> String {
        match self {
            StockLevel::Known { available } => available.to_string(),
            StockLevel::Unknown { .. } => "n/a".to_string(),
        }
    }

    /// Fill of the stock gauge, in percent.
    pub fn bar_percent(&self) -> f64 {
        match self {
            StockLevel::Known { available } => {
                let clamped = (*available).clamp(STOCK_BAR_FLOOR, STOCK_BAR_CEILING);
                f64::from(clamped) * 100.0 / f64::from(STOCK_BAR_CEILING)
            }
            StockLevel::Unknown { .. } => STOCK_BAR_UNKNOWN_PERCENT,
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub product: Product,
    pub stock: StockLevel,
}

impl CatalogItem {
    pub fn new(product: Product, stock: StockLevel) -> Self {
        Self { product, stock }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_labels() {
        assert_eq!(StockLevel::known(12).label(), "12");
        assert_eq!(StockLevel::unknown("timed out").label(), "n/a");
        assert_eq!(StockLevel::unknown("timed out").available(), None);
    }

    #[test]
    fn test_stock_bar_is_clamped() {
        assert_eq!(StockLevel::known(0).bar_percent(), 5.0);
        assert_eq!(StockLevel::known(60).bar_percent(), 50.0);
        assert_eq!(StockLevel::known(500).bar_percent(), 100.0);
        assert_eq!(StockLevel::unknown("x").bar_percent(), 40.0);
    }
}
