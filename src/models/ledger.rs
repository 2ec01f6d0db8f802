use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::money;

/// Stock-in event. Append-only: never updated or deleted once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_cost_cents: Option<i64>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Stock-out event with an immutable price snapshot. `unit_price_cents` and
/// `total_cents` capture the catalog price at the moment of sale; later price
/// edits do not touch them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Sale joined with its product name for the sales report.
#[derive(Debug, Clone, FromRow)]
pub struct SaleWithProduct {
    pub id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SaleDisplay {
    pub id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_text: String,
    pub total_text: String,
    pub recorded_text: String,
}

impl From<SaleWithProduct> for SaleDisplay {
    fn from(s: SaleWithProduct) -> Self {
        Self {
            id: s.id,
            product_name: s.product_name,
            quantity: s.quantity,
            unit_price_text: money::format_brl(s.unit_price_cents),
            total_text: money::format_brl(s.total_cents),
            recorded_text: s.recorded_at.format("%d/%m/%Y %H:%M").to_string(),
        }
    }
}
