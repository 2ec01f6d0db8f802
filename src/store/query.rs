//! Read-only aggregation over the catalog and the ledger. Nothing in here
//! mutates state, and "no data" always comes back as zeros or an empty list,
//! never as an error.

use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};

use crate::database::Database;
use crate::errors::ServiceError;
use crate::models::SaleWithProduct;

/// Products at or below this stock level show up in the dashboard alert.
const LOW_STOCK_THRESHOLD: i64 = 5;
const LOW_STOCK_LIMIT: i64 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductSummary {
    pub quantity_sold: i64,
    pub value_sold_cents: i64,
    pub quantity_received: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesTotals {
    pub items: i64,
    pub value_cents: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LowStockProduct {
    pub id: i64,
    pub name: String,
    pub stock_on_hand: i64,
}

#[derive(Debug)]
pub struct Dashboard {
    pub product_count: i64,
    pub total_stock_units: i64,
    pub total_stock_value_cents: i64,
    pub sales_in_range: SalesTotals,
    pub low_stock: Vec<LowStockProduct>,
}

#[derive(Clone)]
pub struct QueryService {
    pool: Database,
}

impl QueryService {
    pub fn new(pool: Database) -> Self {
        Self { pool }
    }

    /// Ledger totals for one product. Zeros when no rows exist; a summary of
    /// an unknown product id is simply all zeros.
    pub async fn product_summary(&self, product_id: i64) -> Result<ProductSummary, ServiceError> {
        let (quantity_sold, value_sold_cents): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity), 0), COALESCE(SUM(total_cents), 0) FROM sales WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        let quantity_received: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM receipts WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProductSummary {
            quantity_sold,
            value_sold_cents,
            quantity_received,
        })
    }

    /// Sales joined with product names, newest first, plus range totals.
    /// Bounds are inclusive and compared on the local calendar date of the
    /// event; a missing bound leaves that side open.
    pub async fn sales_report(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<(Vec<SaleWithProduct>, SalesTotals), ServiceError> {
        let mut rows_qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT s.id, p.name AS product_name, s.quantity, s.unit_price_cents, s.total_cents, s.recorded_at
            FROM sales s
            JOIN products p ON p.id = s.product_id
            "#,
        );
        push_date_bounds(&mut rows_qb, "s.recorded_at", date_from, date_to);
        rows_qb.push(" ORDER BY s.recorded_at DESC, s.id DESC");

        let sales = rows_qb
            .build_query_as::<SaleWithProduct>()
            .fetch_all(&self.pool)
            .await?;

        let mut totals_qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT COALESCE(SUM(quantity), 0), COALESCE(SUM(total_cents), 0) FROM sales",
        );
        push_date_bounds(&mut totals_qb, "recorded_at", date_from, date_to);

        let (items, value_cents): (i64, i64) = totals_qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await?;

        Ok((sales, SalesTotals { items, value_cents }))
    }

    /// Dashboard KPIs. With no range given, `sales_in_range` covers the
    /// current local calendar day.
    pub async fn dashboard(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Dashboard, ServiceError> {
        let (product_count, total_stock_units, total_stock_value_cents): (i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(stock_on_hand), 0),
                       COALESCE(SUM(unit_price_cents * stock_on_hand), 0)
                FROM products
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        let mut sales_qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT COALESCE(SUM(quantity), 0), COALESCE(SUM(total_cents), 0) FROM sales",
        );
        if date_from.is_none() && date_to.is_none() {
            sales_qb.push(" WHERE date(recorded_at, 'localtime') = date('now', 'localtime')");
        } else {
            push_date_bounds(&mut sales_qb, "recorded_at", date_from, date_to);
        }
        let (items, value_cents): (i64, i64) = sales_qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await?;

        let low_stock = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT id, name, stock_on_hand
            FROM products
            WHERE stock_on_hand <= ?1
            ORDER BY stock_on_hand ASC, name COLLATE NOCASE ASC
            LIMIT ?2
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(Dashboard {
            product_count,
            total_stock_units,
            total_stock_value_cents,
            sales_in_range: SalesTotals { items, value_cents },
            low_stock,
        })
    }
}

fn push_date_bounds(
    qb: &mut QueryBuilder<Sqlite>,
    column: &str,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) {
    let mut prefix = " WHERE ";
    if let Some(from) = date_from {
        qb.push(prefix)
            .push(format!("date({}, 'localtime') >= ", column))
            .push_bind(from.format("%Y-%m-%d").to_string());
        prefix = " AND ";
    }
    if let Some(to) = date_to {
        qb.push(prefix)
            .push(format!("date({}, 'localtime') <= ", column))
            .push_bind(to.format("%Y-%m-%d").to_string());
    }
}
