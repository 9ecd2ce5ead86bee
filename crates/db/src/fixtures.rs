use chrono::{Duration, TimeZone, Utc};
use sqlx::Row;

use farmlink_core::domain::coordinate::Coordinate;
use farmlink_core::domain::product::{Product, ProductId, SellerId};

use crate::repositories::{RepositoryError, SqlProductStore};
use crate::DbPool;

/// Deterministic demo catalog: a handful of sellers clustered around the
/// default buyer location (78.96, 20.59) with delivery radii chosen so that
/// browsing from there yields both deliverable and non-deliverable results,
/// plus one product with no location at all.
pub struct DemoCatalog;

#[derive(Clone, Debug)]
pub struct CategorySeedInfo {
    pub category: String,
    pub count: usize,
}

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub products_seeded: usize,
    pub categories: Vec<CategorySeedInfo>,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

struct SeedSpec {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    price_per_unit: f64,
    minimum_order_quantity: u32,
    stocks_left: u32,
    // Offsets in degrees from the default buyer location.
    location: Option<(f64, f64)>,
    delivery_radius_km: f64,
    seller: &'static str,
}

const SEED_PRODUCTS: &[SeedSpec] = &[
    SeedSpec { id: "seed-rice-1", name: "Basmati Rice", category: "Rice", price_per_unit: 82.5, minimum_order_quantity: 2, stocks_left: 40, location: Some((0.0, 0.02)), delivery_radius_km: 25.0, seller: "seed-seller-1" },
    SeedSpec { id: "seed-rice-2", name: "Sona Masoori Rice", category: "Rice", price_per_unit: 64.0, minimum_order_quantity: 5, stocks_left: 120, location: Some((0.3, 0.3)), delivery_radius_km: 30.0, seller: "seed-seller-1" },
    SeedSpec { id: "seed-rice-3", name: "Brown Rice", category: "Rice", price_per_unit: 95.0, minimum_order_quantity: 1, stocks_left: 15, location: Some((2.0, 2.0)), delivery_radius_km: 50.0, seller: "seed-seller-2" },
    SeedSpec { id: "seed-rice-4", name: "Parboiled Rice", category: "Rice", price_per_unit: 55.0, minimum_order_quantity: 10, stocks_left: 200, location: None, delivery_radius_km: 40.0, seller: "seed-seller-2" },
    SeedSpec { id: "seed-wheat-1", name: "Durum Wheat", category: "Wheat", price_per_unit: 31.0, minimum_order_quantity: 5, stocks_left: 300, location: Some((0.0, -0.03)), delivery_radius_km: 20.0, seller: "seed-seller-3" },
    SeedSpec { id: "seed-wheat-2", name: "Sharbati Wheat", category: "Wheat", price_per_unit: 38.5, minimum_order_quantity: 2, stocks_left: 80, location: Some((-1.5, 1.0)), delivery_radius_km: 60.0, seller: "seed-seller-3" },
    SeedSpec { id: "seed-veg-1", name: "Tomatoes", category: "Vegetables", price_per_unit: 22.0, minimum_order_quantity: 1, stocks_left: 60, location: Some((0.01, 0.01)), delivery_radius_km: 8.0, seller: "seed-seller-4" },
    SeedSpec { id: "seed-veg-2", name: "Onions", category: "Vegetables", price_per_unit: 18.0, minimum_order_quantity: 2, stocks_left: 90, location: Some((0.5, -0.4)), delivery_radius_km: 15.0, seller: "seed-seller-4" },
    SeedSpec { id: "seed-fruit-1", name: "Alphonso Mangoes", category: "Fruits", price_per_unit: 240.0, minimum_order_quantity: 1, stocks_left: 25, location: Some((-0.02, 0.0)), delivery_radius_km: 12.0, seller: "seed-seller-5" },
    SeedSpec { id: "seed-fruit-2", name: "Bananas", category: "Fruits", price_per_unit: 35.0, minimum_order_quantity: 3, stocks_left: 140, location: Some((1.2, -1.1)), delivery_radius_km: 10.0, seller: "seed-seller-5" },
    SeedSpec { id: "seed-pulse-1", name: "Toor Dal", category: "Pulses", price_per_unit: 110.0, minimum_order_quantity: 2, stocks_left: 75, location: Some((0.0, 0.05)), delivery_radius_km: 35.0, seller: "seed-seller-2" },
    SeedSpec { id: "seed-pulse-2", name: "Moong Dal", category: "Pulses", price_per_unit: 98.0, minimum_order_quantity: 1, stocks_left: 55, location: Some((-0.8, 0.9)), delivery_radius_km: 5.0, seller: "seed-seller-1" },
];

const BASE_LONGITUDE: f64 = 78.96;
const BASE_LATITUDE: f64 = 20.59;

impl DemoCatalog {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let store = SqlProductStore::new(pool.clone());
        let base_listed_at =
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).single().ok_or_else(|| {
                RepositoryError::Decode("invalid fixture base timestamp".to_string())
            })?;

        let mut categories: Vec<CategorySeedInfo> = Vec::new();
        for (index, spec) in SEED_PRODUCTS.iter().enumerate() {
            let location = match spec.location {
                Some((longitude_offset, latitude_offset)) => Some(
                    Coordinate::new(
                        BASE_LONGITUDE + longitude_offset,
                        BASE_LATITUDE + latitude_offset,
                    )
                    .map_err(|error| {
                        RepositoryError::Decode(format!(
                            "fixture `{}` has invalid location: {error}",
                            spec.id
                        ))
                    })?,
                ),
                None => None,
            };

            let product = Product {
                id: ProductId(spec.id.to_string()),
                name: spec.name.to_string(),
                image: format!("https://img.farmlink.example/{}.jpg", spec.id),
                brand: "Farmlink Demo".to_string(),
                measuring_unit: "kg".to_string(),
                price_per_unit: spec.price_per_unit,
                minimum_order_quantity: spec.minimum_order_quantity,
                stocks_left: spec.stocks_left,
                location,
                delivery_radius_km: spec.delivery_radius_km,
                seller_id: SellerId(spec.seller.to_string()),
                category: spec.category.to_string(),
                // Staggered listing times keep recency ordering deterministic.
                listed_at: base_listed_at + Duration::minutes(index as i64),
            };
            store.save(&product).await?;

            match categories.iter_mut().find(|entry| entry.category == spec.category) {
                Some(entry) => entry.count += 1,
                None => categories
                    .push(CategorySeedInfo { category: spec.category.to_string(), count: 1 }),
            }
        }

        Ok(SeedResult { products_seeded: SEED_PRODUCTS.len(), categories })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM products WHERE id LIKE 'seed-%'")
            .fetch_one(pool)
            .await?
            .get("count");
        let unlocated: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM products WHERE id LIKE 'seed-%' AND longitude IS NULL",
        )
        .fetch_one(pool)
        .await?
        .get("count");
        let rice: i64 =
            sqlx::query("SELECT COUNT(*) AS count FROM products WHERE category = 'Rice' AND id LIKE 'seed-%'")
                .fetch_one(pool)
                .await?
                .get("count");

        let checks: Vec<(&'static str, bool)> = vec![
            ("seed-products-present", total == SEED_PRODUCTS.len() as i64),
            ("seed-unlocated-product-present", unlocated == 1),
            ("seed-rice-category-present", rice == 4),
        ];
        let all_present = checks.iter().all(|(_, passed)| *passed);

        Ok(VerificationResult { all_present, checks })
    }
}
