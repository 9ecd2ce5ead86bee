use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::Row;
use uuid::Uuid;

use farmlink_core::analytics::SalesRecord;
use farmlink_core::domain::product::ProductId;
use farmlink_core::orders::{OrderGateway, OrderLine, OrderSubmitError};

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed order gateway. A submission inserts all lines in one
/// transaction; either the whole order lands or none of it does.
pub struct SqlOrderGateway {
    pool: DbPool,
}

impl SqlOrderGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert_lines(&self, lines: &[OrderLine]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let placed_at = Utc::now().to_rfc3339();

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO orders (
                    id, product_id, order_qty, order_longitude, order_latitude,
                    seller_id, placed_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&line.product_id.0)
            .bind(i64::from(line.order_qty))
            .bind(line.order_location.longitude())
            .bind(line.order_location.latitude())
            .bind(&line.seller_id.0)
            .bind(&placed_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Submitted orders joined with the current product catalog, oldest
    /// first, for the sales rollups. Orders whose product has since been
    /// deleted keep a row with no price or category.
    pub async fn sales_records(&self) -> Result<Vec<SalesRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT o.product_id, o.order_qty, o.placed_at,
                   p.price_per_unit, p.category
            FROM orders o
            LEFT JOIN products p ON p.id = o.product_id
            ORDER BY o.placed_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let placed_at_raw: String = row.get("placed_at");
                let placed_at = DateTime::parse_from_rfc3339(&placed_at_raw).map_err(|error| {
                    RepositoryError::Decode(format!(
                        "invalid placed_at `{placed_at_raw}`: {error}"
                    ))
                })?;
                let order_qty: i64 = row.get("order_qty");
                let price_per_unit: Option<f64> = row.get("price_per_unit");

                Ok(SalesRecord {
                    product_id: ProductId(row.get("product_id")),
                    order_qty: u32::try_from(order_qty).unwrap_or(0),
                    price_per_unit: price_per_unit.and_then(Decimal::from_f64),
                    category: row.get("category"),
                    date: placed_at.date_naive(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderGateway for SqlOrderGateway {
    async fn submit(&self, lines: &[OrderLine]) -> Result<(), OrderSubmitError> {
        Ok(self.insert_lines(lines).await?)
    }
}
