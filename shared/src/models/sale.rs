//! Sale Models
//!
//! A sale owns its line items. Lifecycle: `active` (open tab) →
//! `completed`, or any → `CANCELLED` (void, restores stock). The mixed-case
//! status strings are the system's canonical wire values.

use serde::{Deserialize, Serialize};

use super::{Item, PaymentMethod, Table, UserSummary};

/// Sale status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum SaleStatus {
    #[serde(rename = "active")]
    #[cfg_attr(feature = "db", sqlx(rename = "active"))]
    Active,
    #[serde(rename = "completed")]
    #[cfg_attr(feature = "db", sqlx(rename = "completed"))]
    Completed,
    #[serde(rename = "CANCELLED")]
    #[cfg_attr(feature = "db", sqlx(rename = "CANCELLED"))]
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Active => "active",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sale header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub total: f64,
    pub status: SaleStatus,
    pub user_id: i64,
    pub table_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<SaleItem>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub table: Option<Table>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Sale line item
///
/// `price` is the unit price captured from the client at sale time and is
/// never recomputed from the item master — historical pricing survives
/// later item edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub item_id: i64,
    pub quantity: i64,
    pub price: f64,

    /// Referenced inventory item (populated by application code)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub item: Option<Item>,
}

/// One input line for sale creation/update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineInput {
    pub item_id: i64,
    pub quantity: i64,
    pub price: f64,
}

/// Create sale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreate {
    pub items: Vec<SaleLineInput>,
    pub total: f64,
    /// Defaults to the authenticated user
    pub user_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub table_id: Option<i64>,
    /// Defaults to `completed`
    pub status: Option<SaleStatus>,
}

/// Update sale payload, absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleUpdate {
    pub items: Option<Vec<SaleLineInput>>,
    pub status: Option<SaleStatus>,
    pub total: Option<f64>,
    pub payment_method_id: Option<i64>,
}

/// PATCH body for sale actions (`{"action": "void"}`)
#[derive(Debug, Clone, Deserialize)]
pub struct SaleActionRequest {
    pub action: String,
}
