#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use adega::database::{init_schema, Database};
use adega::models::ProductInput;
use adega::store::CatalogStore;

/// Fresh in-memory database. A single connection keeps every query in the
/// test on the same memory database.
pub async fn test_pool() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    init_schema(&pool).await.expect("schema");
    pool
}

pub fn product_input(name: &str, unit_price_cents: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        variety: None,
        vintage: None,
        region: None,
        description: None,
        image_url: None,
        unit_price_cents,
    }
}

pub async fn seed_product(pool: &Database, name: &str, unit_price_cents: i64) -> i64 {
    CatalogStore::new(pool.clone())
        .create(product_input(name, unit_price_cents))
        .await
        .expect("seed product")
        .id
}

/// Inserts a sale row directly with a chosen timestamp, for report tests
/// that need history older than "now".
pub async fn insert_sale_at(
    pool: &Database,
    product_id: i64,
    quantity: i64,
    unit_price_cents: i64,
    recorded_at: DateTime<Utc>,
) {
    sqlx::query(
        r#"
        INSERT INTO sales (product_id, quantity, unit_price_cents, total_cents, recorded_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price_cents)
    .bind(quantity * unit_price_cents)
    .bind(recorded_at)
    .execute(pool)
    .await
    .expect("insert sale");
}

pub async fn stock_of(pool: &Database, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT stock_on_hand FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("stock")
}

pub async fn sale_count(pool: &Database, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE product_id = ?1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("sale count")
}
