//! Catalog store: owns product records. Everything except `stock_on_hand`
//! is mutated here; stock moves only through the stock engine.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use crate::database::Database;
use crate::errors::ServiceError;
use crate::models::{Product, ProductInput};

/// Closed set of catalog orderings. Request parameters are mapped through
/// this enum so caller text never reaches the ORDER BY clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductOrder {
    #[default]
    MostRecent,
    PriceAsc,
    PriceDesc,
    NameAsc,
}

impl ProductOrder {
    /// Unrecognized values fall back to the default ordering instead of
    /// failing the request.
    pub fn from_param(param: &str) -> Self {
        match param {
            "preco_asc" => Self::PriceAsc,
            "preco_desc" => Self::PriceDesc,
            "nome_asc" => Self::NameAsc,
            _ => Self::MostRecent,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::MostRecent => "recentes",
            Self::PriceAsc => "preco_asc",
            Self::PriceDesc => "preco_desc",
            Self::NameAsc => "nome_asc",
        }
    }

    fn order_by_sql(self) -> &'static str {
        match self {
            Self::MostRecent => "created_at DESC, id DESC",
            Self::PriceAsc => "unit_price_cents ASC, id DESC",
            Self::PriceDesc => "unit_price_cents DESC, id DESC",
            Self::NameAsc => "name COLLATE NOCASE ASC, id DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match against name, variety and region.
    pub search: Option<String>,
    /// Exact match on variety.
    pub variety: Option<String>,
    /// Exact match on region.
    pub region: Option<String>,
}

#[derive(Clone)]
pub struct CatalogStore {
    pool: Database,
}

impl CatalogStore {
    pub fn new(pool: Database) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: ProductInput) -> Result<Product, ServiceError> {
        validate(&input)?;

        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, variety, vintage, region, description, image_url, unit_price_cents, stock_on_hand, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
            "#,
        )
        .bind(&input.name)
        .bind(&input.variety)
        .bind(&input.vintage)
        .bind(&input.region)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.unit_price_cents)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, id: i64) -> Result<Product, ServiceError> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {} not found", id)))
    }

    /// Updates catalog attributes. Never touches `stock_on_hand`.
    pub async fn update(&self, id: i64, input: ProductInput) -> Result<Product, ServiceError> {
        validate(&input)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?1, variety = ?2, vintage = ?3, region = ?4, description = ?5, image_url = ?6, unit_price_cents = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&input.name)
        .bind(&input.variety)
        .bind(&input.vintage)
        .bind(&input.region)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.unit_price_cents)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("product {} not found", id)));
        }

        self.get(id).await
    }

    /// Deletes a product and returns its name for the caller's notice.
    /// Blocked while ledger rows reference the product: removing it would
    /// orphan sales and receipts and make past reports unreconstructible.
    pub async fn delete(&self, id: i64) -> Result<String, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let name: Option<String> = sqlx::query_scalar("SELECT name FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let name = name.ok_or_else(|| ServiceError::NotFound(format!("product {} not found", id)))?;

        let movements: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM receipts WHERE product_id = ?1)
                 + (SELECT COUNT(*) FROM sales WHERE product_id = ?1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if movements > 0 {
            return Err(ServiceError::Conflict(format!(
                "product '{}' has recorded stock movements and cannot be deleted",
                name
            )));
        }

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(name)
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
    ) -> Result<Vec<Product>, ServiceError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, name, variety, vintage, region, description, image_url, unit_price_cents, stock_on_hand, created_at FROM products",
        );

        let mut prefix = " WHERE ";
        if let Some(q) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let like = format!("%{}%", q);
            qb.push(prefix)
                .push("(name LIKE ")
                .push_bind(like.clone())
                .push(" OR variety LIKE ")
                .push_bind(like.clone())
                .push(" OR region LIKE ")
                .push_bind(like)
                .push(")");
            prefix = " AND ";
        }
        if let Some(v) = filter.variety.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            qb.push(prefix)
                .push("COALESCE(variety, '') = ")
                .push_bind(v.to_string());
            prefix = " AND ";
        }
        if let Some(r) = filter.region.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            qb.push(prefix)
                .push("COALESCE(region, '') = ")
                .push_bind(r.to_string());
        }

        qb.push(" ORDER BY ").push(order.order_by_sql());

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Distinct non-empty varieties, for the filter dropdown.
    pub async fn distinct_varieties(&self) -> Result<Vec<String>, ServiceError> {
        let rows = sqlx::query_scalar(
            "SELECT DISTINCT variety FROM products WHERE variety IS NOT NULL AND variety <> '' ORDER BY variety COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Distinct non-empty regions, for the filter dropdown.
    pub async fn distinct_regions(&self) -> Result<Vec<String>, ServiceError> {
        let rows = sqlx::query_scalar(
            "SELECT DISTINCT region FROM products WHERE region IS NOT NULL AND region <> '' ORDER BY region COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn validate(input: &ProductInput) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("product name is required".to_string()));
    }
    if input.unit_price_cents < 0 {
        return Err(ServiceError::InvalidInput("price must not be negative".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_order_param_falls_back_to_most_recent() {
        assert_eq!(ProductOrder::from_param("recentes"), ProductOrder::MostRecent);
        assert_eq!(ProductOrder::from_param("preco_asc"), ProductOrder::PriceAsc);
        assert_eq!(ProductOrder::from_param("preco_desc"), ProductOrder::PriceDesc);
        assert_eq!(ProductOrder::from_param("nome_asc"), ProductOrder::NameAsc);
        assert_eq!(
            ProductOrder::from_param("id; DROP TABLE products"),
            ProductOrder::MostRecent
        );
        assert_eq!(ProductOrder::from_param(""), ProductOrder::MostRecent);
    }

    #[test]
    fn validate_requires_name() {
        let input = ProductInput {
            name: "  ".to_string(),
            variety: None,
            vintage: None,
            region: None,
            description: None,
            image_url: None,
            unit_price_cents: 100,
        };
        assert!(matches!(validate(&input), Err(ServiceError::InvalidInput(_))));
    }
}
