//! Settings Model (singleton)

use serde::{Deserialize, Serialize};

/// Store-wide settings — one row, lazily created with defaults on first read
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Settings {
    pub id: i64,
    pub currency: String,
    pub currency_symbol: String,
    pub tax_enabled: bool,
    /// Percent, e.g. 10.0 for 10%
    pub tax_rate: f64,
    pub tax_name: String,
    pub table_count: i64,
    pub app_name: Option<String>,
    pub logo_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Update settings payload — absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub tax_enabled: Option<bool>,
    pub tax_rate: Option<f64>,
    pub tax_name: Option<String>,
    pub table_count: Option<i64>,
    pub app_name: Option<String>,
    pub logo_path: Option<String>,
}

/// Public branding subset, served without authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub app_name: String,
    pub logo_path: String,
}
