use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use farmlink_core::catalog::store::{ProductQueryPage, ProductStore, StoreError};
use farmlink_core::domain::coordinate::Coordinate;
use farmlink_core::domain::product::{Product, ProductId, SellerId};

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed product store.
///
/// Category pages are served newest first; the total match count comes from
/// a separate `COUNT(*)` over the same filter, so pagination sees the whole
/// category, not just the fetched window.
pub struct SqlProductStore {
    pool: DbPool,
}

impl SqlProductStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, image, brand, measuring_unit, price_per_unit,
                minimum_order_quantity, stocks_left, longitude, latitude,
                delivery_radius_km, seller_id, category, listed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image,
                brand = excluded.brand,
                measuring_unit = excluded.measuring_unit,
                price_per_unit = excluded.price_per_unit,
                minimum_order_quantity = excluded.minimum_order_quantity,
                stocks_left = excluded.stocks_left,
                longitude = excluded.longitude,
                latitude = excluded.latitude,
                delivery_radius_km = excluded.delivery_radius_km,
                seller_id = excluded.seller_id,
                category = excluded.category,
                listed_at = excluded.listed_at
            "#,
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(&product.image)
        .bind(&product.brand)
        .bind(&product.measuring_unit)
        .bind(product.price_per_unit)
        .bind(i64::from(product.minimum_order_quantity))
        .bind(i64::from(product.stocks_left))
        .bind(product.location.map(|location| location.longitude()))
        .bind(product.location.map(|location| location.latitude()))
        .bind(product.delivery_radius_km)
        .bind(&product.seller_id.0)
        .bind(&product.category)
        .bind(product.listed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Total rows in the catalog, used by readiness checks to prove the
    /// schema exists without depending on any particular seed state.
    pub async fn count_all(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn query_page(
        &self,
        category: &str,
        offset: u32,
        limit: u32,
    ) -> Result<ProductQueryPage, RepositoryError> {
        let total_matching: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM products WHERE category = ?")
                .bind(category)
                .fetch_one(&self.pool)
                .await?
                .get("count");

        let rows = sqlx::query(
            r#"
            SELECT id, name, image, brand, measuring_unit, price_per_unit,
                   minimum_order_quantity, stocks_left, longitude, latitude,
                   delivery_radius_km, seller_id, category, listed_at
            FROM products
            WHERE category = ?
            ORDER BY listed_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(category)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        let items =
            rows.iter().map(row_to_product).collect::<Result<Vec<_>, RepositoryError>>()?;
        let total_matching = u64::try_from(total_matching).unwrap_or(0);

        Ok(ProductQueryPage { items, total_matching })
    }

    async fn query_stocks(&self, id: &ProductId) -> Result<Option<u32>, RepositoryError> {
        let row = sqlx::query("SELECT stocks_left FROM products WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            let stocks: i64 = row.get("stocks_left");
            u32::try_from(stocks)
                .map_err(|_| RepositoryError::Decode(format!("negative stock for `{}`", id.0)))
        })
        .transpose()
    }

    async fn query_by_seller(&self, seller_id: &SellerId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, image, brand, measuring_unit, price_per_unit,
                   minimum_order_quantity, stocks_left, longitude, latitude,
                   delivery_radius_km, seller_id, category, listed_at
            FROM products
            WHERE seller_id = ?
            ORDER BY listed_at DESC
            "#,
        )
        .bind(&seller_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect()
    }
}

#[async_trait]
impl ProductStore for SqlProductStore {
    async fn products_by_category(
        &self,
        category: &str,
        offset: u32,
        limit: u32,
    ) -> Result<ProductQueryPage, StoreError> {
        Ok(self.query_page(category, offset, limit).await?)
    }

    async fn stocks_for(&self, id: &ProductId) -> Result<Option<u32>, StoreError> {
        Ok(self.query_stocks(id).await?)
    }

    async fn products_by_seller(
        &self,
        seller_id: &SellerId,
    ) -> Result<Vec<Product>, StoreError> {
        Ok(self.query_by_seller(seller_id).await?)
    }
}

fn row_to_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let listed_at_raw: String = row.get("listed_at");
    let listed_at = DateTime::parse_from_rfc3339(&listed_at_raw)
        .map_err(|error| {
            RepositoryError::Decode(format!("invalid listed_at `{listed_at_raw}`: {error}"))
        })?
        .with_timezone(&Utc);

    // Rows with missing or out-of-range coordinates decode to a location-less
    // product; the fetcher counts them instead of failing the page.
    let longitude: Option<f64> = row.get("longitude");
    let latitude: Option<f64> = row.get("latitude");
    let location = match (longitude, latitude) {
        (Some(longitude), Some(latitude)) => Coordinate::new(longitude, latitude).ok(),
        _ => None,
    };

    let minimum_order_quantity: i64 = row.get("minimum_order_quantity");
    let stocks_left: i64 = row.get("stocks_left");

    Ok(Product {
        id: ProductId(row.get("id")),
        name: row.get("name"),
        image: row.get("image"),
        brand: row.get("brand"),
        measuring_unit: row.get("measuring_unit"),
        price_per_unit: row.get("price_per_unit"),
        minimum_order_quantity: u32::try_from(minimum_order_quantity).unwrap_or(1).max(1),
        stocks_left: u32::try_from(stocks_left).unwrap_or(0),
        location,
        delivery_radius_km: row.get("delivery_radius_km"),
        seller_id: SellerId(row.get("seller_id")),
        category: row.get("category"),
        listed_at,
    })
}
