//! Stock engine: the only mutation path for `stock_on_hand`. Each operation
//! is one transaction covering the ledger insert and the stock update, so no
//! reader ever sees a ledger row without its stock effect (or the reverse).

use chrono::Utc;
use log::debug;

use crate::database::Database;
use crate::errors::ServiceError;
use crate::models::{Receipt, Sale};

#[derive(Debug, Clone)]
pub struct ReceiveStock {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_cost_cents: Option<i64>,
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct StockEngine {
    pool: Database,
}

impl StockEngine {
    pub fn new(pool: Database) -> Self {
        Self { pool }
    }

    /// Records a stock-in event: inserts the receipt row and increments the
    /// product's stock in the same transaction.
    pub async fn receive_stock(&self, input: ReceiveStock) -> Result<Receipt, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be a positive integer".to_string(),
            ));
        }
        if matches!(input.unit_cost_cents, Some(c) if c < 0) {
            return Err(ServiceError::InvalidInput(
                "unit cost must not be negative".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
            .bind(input.product_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!(
                "product {} not found",
                input.product_id
            )));
        }

        let recorded_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO receipts (product_id, quantity, unit_cost_cents, note, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.unit_cost_cents)
        .bind(&input.note)
        .bind(recorded_at)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        sqlx::query("UPDATE products SET stock_on_hand = stock_on_hand + ?1 WHERE id = ?2")
            .bind(input.quantity)
            .bind(input.product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            "receipt {} recorded: product {} +{}",
            id, input.product_id, input.quantity
        );

        Ok(Receipt {
            id,
            product_id: input.product_id,
            quantity: input.quantity,
            unit_cost_cents: input.unit_cost_cents,
            note: input.note,
            recorded_at,
        })
    }

    /// Records a sale: snapshots the current catalog price, decrements stock
    /// and inserts the sale row atomically.
    ///
    /// The decrement is guarded (`stock_on_hand >= quantity` in the UPDATE
    /// itself), so two concurrent sales can never both pass a stale stock
    /// check and jointly oversell.
    pub async fn record_sale(&self, product_id: i64, quantity: i64) -> Result<Sale, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let product: Option<(String, i64)> =
            sqlx::query_as("SELECT name, unit_price_cents FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((name, unit_price_cents)) = product else {
            return Err(ServiceError::NotFound(format!(
                "product {} not found",
                product_id
            )));
        };

        let updated = sqlx::query(
            "UPDATE products SET stock_on_hand = stock_on_hand - ?1 WHERE id = ?2 AND stock_on_hand >= ?1",
        )
        .bind(quantity)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls everything back.
            return Err(ServiceError::InsufficientStock(name));
        }

        let total_cents = quantity.checked_mul(unit_price_cents).ok_or_else(|| {
            ServiceError::InvalidInput("sale total out of range".to_string())
        })?;

        let recorded_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO sales (product_id, quantity, unit_price_cents, total_cents, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price_cents)
        .bind(total_cents)
        .bind(recorded_at)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        tx.commit().await?;

        debug!(
            "sale {} recorded: product {} -{} @ {}",
            id, product_id, quantity, unit_price_cents
        );

        Ok(Sale {
            id,
            product_id,
            quantity,
            unit_price_cents,
            total_cents,
            recorded_at,
        })
    }
}
