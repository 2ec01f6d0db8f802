use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::money;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub variety: Option<String>,
    pub vintage: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub unit_price_cents: i64,
    /// Mutated only by the stock engine, never by catalog edits.
    pub stock_on_hand: i64,
    pub created_at: DateTime<Utc>,
}

/// Catalog attributes supplied by the create/edit forms. Deliberately has no
/// stock field: stock moves only through the ledger.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub variety: Option<String>,
    pub vintage: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub unit_price_cents: i64,
}

/// Flattened product for templates: options become plain text and money is
/// pre-formatted.
#[derive(Debug)]
pub struct ProductDisplay {
    pub id: i64,
    pub name: String,
    pub variety: String,
    pub vintage: String,
    pub region: String,
    pub description: String,
    pub image_url: String,
    pub price_text: String,
    pub unit_price_cents: i64,
    pub stock_on_hand: i64,
    pub created_date: String,
}

impl From<Product> for ProductDisplay {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            variety: p.variety.unwrap_or_default(),
            vintage: p.vintage.unwrap_or_default(),
            region: p.region.unwrap_or_default(),
            description: p.description.unwrap_or_default(),
            image_url: p.image_url.unwrap_or_default(),
            price_text: money::format_brl(p.unit_price_cents),
            unit_price_cents: p.unit_price_cents,
            stock_on_hand: p.stock_on_hand,
            created_date: p.created_at.format("%d/%m/%Y").to_string(),
        }
    }
}
