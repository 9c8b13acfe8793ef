//! Item Model

use serde::{Deserialize, Serialize};

use super::Category;

/// Inventory item
///
/// `stock` is adjusted by direct edits and by the sale pipeline
/// (decrement on completion, restore on void).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category_id: i64,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    pub image: Option<String>,
    pub image_type: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    /// Owning category (populated by application code, skipped by FromRow)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub category: Option<Category>,
}

pub fn default_emoji() -> String {
    "📦".to_string()
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Defaults to 0 (out of stock) when omitted
    #[serde(default)]
    pub stock: i64,
    pub category_id: i64,
    pub emoji: Option<String>,
    pub image: Option<String>,
    pub image_type: Option<String>,
}

/// Update item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category_id: Option<i64>,
    pub emoji: Option<String>,
    pub image: Option<String>,
    pub image_type: Option<String>,
}
