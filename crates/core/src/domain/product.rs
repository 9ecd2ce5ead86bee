use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::coordinate::Coordinate;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SellerId(pub String);

/// Catalog view of a product as served by the product store.
///
/// The core treats this as read-only input. `price_per_unit` stays a raw
/// float here because it arrives from JSON-shaped payloads; the cart ledger
/// coerces it into an exact decimal at its own boundary. A product without a
/// usable `location` is still listable but can never be classified for
/// delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub measuring_unit: String,
    pub price_per_unit: f64,
    #[serde(default = "default_minimum_order_quantity")]
    pub minimum_order_quantity: u32,
    pub stocks_left: u32,
    pub location: Option<Coordinate>,
    pub delivery_radius_km: f64,
    pub seller_id: SellerId,
    pub category: String,
    pub listed_at: DateTime<Utc>,
}

fn default_minimum_order_quantity() -> u32 {
    1
}
