//! Compound client-side filtering and facet derivation.

use std::collections::BTreeSet;

use crate::item::CatalogItem;

/// Filter selections. Blank values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Whether no predicate is active.
    pub fn is_empty(&self) -> bool {
        selected(&self.category).is_none()
            && selected(&self.brand).is_none()
            && selected(&self.search).is_none()
    }

    /// Tests one item against every active predicate.
    ///
    /// Category and brand are exact matches. Search is a case-insensitive substring
    /// match against name, brand, category and description together.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let product = &item.product;
        if let Some(category) = selected(&self.category)
            && product.category_facet() != Some(category)
        {
            return false;
        }
        if let Some(brand) = selected(&self.brand)
            && product.brand_facet() != Some(brand)
        {
            return false;
        }
        if let Some(text) = selected(&self.search) {
            return product.search_haystack().contains(&text.to_lowercase());
        }
        true
    }

    /// Recomputes the visible subset of `items`, preserving order.
    pub fn apply<'a>(&self, items: &'a [CatalogItem]) -> Vec<&'a CatalogItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Distinct filter values present in a catalog, sorted lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
}

impl Facets {
    pub fn from_items(items: &[CatalogItem]) -> Self {
        let mut categories = BTreeSet::new();
        let mut brands = BTreeSet::new();
        for item in items {
            if let Some(category) = item.product.category_facet() {
                categories.insert(category.to_string());
            }
            if let Some(brand) = item.product.brand_facet() {
                brands.insert(brand.to_string());
            }
        }
        Self {
            categories: categories.into_iter().collect(),
            brands: brands.into_iter().collect(),
        }
    }
}
