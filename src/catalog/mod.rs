//! Read-only catalog.
//!
//! The catalog ships with the binary as a JSON document; a file path in the
//! config replaces it. Nothing here mutates after load.

pub mod model;

use crate::cart::line::{Money, Price};
use crate::session::Filter;
use anyhow::{Context, Result};
use model::{Category, CatalogDocument, MenuItem, Restaurant};
use std::path::Path;
use thiserror::Error;

const BUNDLED_MENU: &str = include_str!("../../data/menu.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no items")]
    Empty,
    #[error("item {0:?} has no variants")]
    NoVariants(String),
}

/// Optional criteria for [`Catalog::filter_items`]; `None` fields match all.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub vegetarian: Option<bool>,
    pub spicy: Option<bool>,
    pub category: Option<String>,
    pub price_range: Option<(Money, Money)>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    doc: CatalogDocument,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        let catalog = Self { doc };
        if catalog.all_items().next().is_none() {
            return Err(CatalogError::Empty);
        }
        if let Some(item) = catalog.all_items().find(|i| i.variants.is_empty()) {
            return Err(CatalogError::NoVariants(item.id.clone()));
        }
        Ok(catalog)
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_MENU)
    }

    /// Load from `path` if given, otherwise the bundled menu.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read catalog from {}", path.display()))?;
                Self::from_json(&json)
                    .with_context(|| format!("Invalid catalog in {}", path.display()))
            }
            None => Self::bundled().context("Bundled catalog is invalid"),
        }
    }

    pub fn restaurant(&self) -> &Restaurant {
        &self.doc.restaurant
    }

    pub fn categories(&self) -> &[Category] {
        &self.doc.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.doc.categories.iter().find(|c| c.id == id)
    }

    pub fn all_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.doc.categories.iter().flat_map(|c| c.items.iter())
    }

    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.all_items().find(|i| i.id == id)
    }

    /// Items visible under the active filter, in catalog order.
    pub fn items_for(&self, filter: &Filter) -> Vec<&MenuItem> {
        match filter {
            Filter::All => self.all_items().collect(),
            Filter::Category(id) => self
                .category(id)
                .map(|c| c.items.iter().collect())
                .unwrap_or_default(),
        }
    }

    /// Case-insensitive match over name, description, tags and category.
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&MenuItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.all_items()
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
                    || item.tags.iter().any(|t| t.to_lowercase().contains(&needle))
                    || item.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn filter_items(&self, filter: &ItemFilter) -> Vec<&MenuItem> {
        self.all_items()
            .filter(|item| {
                if filter.vegetarian.is_some_and(|v| item.is_vegetarian != v) {
                    return false;
                }
                if filter.spicy.is_some_and(|s| item.is_spicy != s) {
                    return false;
                }
                if let Some(ref category) = filter.category {
                    if &item.category != category {
                        return false;
                    }
                }
                if let Some((min, max)) = filter.price_range {
                    // Market-priced items are never excluded by price
                    if let Some(Price::Fixed(price)) = item.base_variant().map(|v| v.price) {
                        if price < min || price > max {
                            return false;
                        }
                    }
                }
                true
            })
            .collect()
    }

    /// Highest rated first; ties keep catalog order.
    pub fn featured(&self, count: usize) -> Vec<&MenuItem> {
        let mut items: Vec<&MenuItem> = self.all_items().collect();
        items.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        items.truncate(count);
        items
    }
}
