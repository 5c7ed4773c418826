//! Catalog products and their inventory enrichment.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Unnamed product";
pub const DEFAULT_BRAND: &str = "Independent";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// A product as listed by the catalog service.
///
/// Descriptive fields are optional on the wire; the `display_*` accessors
/// supply the storefront defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Product {
    pub fn display_name(&self) -> &str {
        non_blank(&self.name).unwrap_or(DEFAULT_NAME)
    }

    pub fn display_brand(&self) -> &str {
        non_blank(&self.brand).unwrap_or(DEFAULT_BRAND)
    }

    pub fn display_category(&self) -> &str {
        non_blank(&self.category).unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn display_description(&self) -> &str {
        non_blank(&self.description).unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Price, or zero when the service omitted it.
    pub fn display_price(&self) -> Money {
        self.price.unwrap_or_default()
    }

    /// Category used for facets and exact-match filtering, if any.
    pub fn category_facet(&self) -> Option<&str> {
        non_blank(&self.category)
    }

    /// Brand used for facets and exact-match filtering, if any.
    pub fn brand_facet(&self) -> Option<&str> {
        non_blank(&self.brand)
    }

    /// Lower-cased text searched by free-text filters.
    pub fn search_haystack(&self) -> String {
        [&self.name, &self.brand, &self.category, &self.description]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Response of `GET /api/products/{id}/stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub available_quantity: i64,
}

/// Body of an admin product create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price: Money,
    pub category: String,
    /// Initial stock, sent on create only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<u32>,
    /// Stock adjustment, sent on update only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_delta: Option<i32>,
}

impl ProductDraft {
    /// Rejects drafts the catalog service would refuse.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("Name", &self.name),
            ("Brand", &self.brand),
            ("Description", &self.description),
            ("Category", &self.category),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        if !self.price.is_positive() {
            return Err("Price must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let product: Product = serde_json::from_value(json!({ "id": 4, "brand": "  " })).unwrap();

        assert_eq!(product.display_name(), DEFAULT_NAME);
        assert_eq!(product.display_brand(), DEFAULT_BRAND);
        assert_eq!(product.display_category(), DEFAULT_CATEGORY);
        assert_eq!(product.display_description(), DEFAULT_DESCRIPTION);
        assert_eq!(product.display_price(), Money::zero());
        assert_eq!(product.brand_facet(), None);
    }

    #[test]
    fn test_search_haystack_covers_descriptive_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "name": "Trail Shoe",
            "brand": "Ridge",
            "category": "Footwear",
            "description": "Grippy sole",
            "price": 89.5
        }))
        .unwrap();

        assert_eq!(product.search_haystack(), "trail shoe ridge footwear grippy sole");
        assert_eq!(product.display_price(), Money::from_cents(8950));
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = ProductDraft {
            name: "Lamp".to_string(),
            brand: "Glow".to_string(),
            description: "Desk lamp".to_string(),
            price: Money::from_cents(1999),
            category: "Home".to_string(),
            inventory: Some(5),
            inventory_delta: None,
        };
        assert!(draft.validate().is_ok());

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["inventory"], 5);
        assert!(body.get("inventoryDelta").is_none());

        draft.price = Money::zero();
        assert_eq!(draft.validate().unwrap_err(), "Price must be greater than zero");

        draft.category = " ".to_string();
        assert_eq!(draft.validate().unwrap_err(), "Category is required");
    }
}
