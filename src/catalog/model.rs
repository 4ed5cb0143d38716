//! Catalog document model.
//!
//! Mirrors the shipped `menu.json`: a restaurant header and categories, each
//! holding items with one or more priced variants.

use crate::cart::line::Variant;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub restaurant: Restaurant,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub delivery_time: String,
    #[serde(default)]
    pub status: OpenStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenStatus {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Fresh,
    Frozen,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_spicy: bool,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub includes: Option<Vec<String>>,
}

impl MenuItem {
    /// The variant shown on cards and used for price-range filters.
    pub fn base_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }
}
