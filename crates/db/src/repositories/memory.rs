use async_trait::async_trait;
use tokio::sync::RwLock;

use farmlink_core::catalog::store::{ProductQueryPage, ProductStore, StoreError};
use farmlink_core::domain::product::{Product, ProductId, SellerId};

/// In-memory product store for tests and offline demos. Mirrors the SQL
/// store's ordering contract: newest first within a category.
#[derive(Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub async fn insert(&self, product: Product) {
        let mut products = self.products.write().await;
        products.retain(|existing| existing.id != product.id);
        products.push(product);
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn products_by_category(
        &self,
        category: &str,
        offset: u32,
        limit: u32,
    ) -> Result<ProductQueryPage, StoreError> {
        let products = self.products.read().await;
        let mut matching: Vec<Product> =
            products.iter().filter(|product| product.category == category).cloned().collect();
        matching.sort_by(|a, b| b.listed_at.cmp(&a.listed_at));

        let total_matching = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok(ProductQueryPage { items, total_matching })
    }

    async fn stocks_for(&self, id: &ProductId) -> Result<Option<u32>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).map(|product| product.stocks_left))
    }

    async fn products_by_seller(
        &self,
        seller_id: &SellerId,
    ) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> =
            products.iter().filter(|product| &product.seller_id == seller_id).cloned().collect();
        listed.sort_by(|a, b| b.listed_at.cmp(&a.listed_at));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use farmlink_core::catalog::store::ProductStore;
    use farmlink_core::domain::coordinate::Coordinate;
    use farmlink_core::domain::product::{Product, ProductId, SellerId};

    use super::InMemoryProductStore;

    fn product(id: &str, category: &str, age_minutes: i64) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: format!("product {id}"),
            image: String::new(),
            brand: String::new(),
            measuring_unit: "kg".to_string(),
            price_per_unit: 10.0,
            minimum_order_quantity: 1,
            stocks_left: 5,
            location: Some(Coordinate::new(78.96, 20.59).expect("valid coordinate")),
            delivery_radius_km: 10.0,
            seller_id: SellerId("s-1".to_string()),
            category: category.to_string(),
            listed_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn category_pages_match_the_sql_ordering_contract() {
        let store = InMemoryProductStore::default();
        store.insert(product("p-old", "Rice", 30)).await;
        store.insert(product("p-new", "Rice", 1)).await;
        store.insert(product("p-wheat", "Wheat", 2)).await;

        let page = store.products_by_category("Rice", 0, 10).await.expect("query");

        let ids: Vec<&str> = page.items.iter().map(|p| p.id.0.as_str()).collect();
        assert_eq!(ids, ["p-new", "p-old"]);
        assert_eq!(page.total_matching, 2);
    }

    #[tokio::test]
    async fn insert_replaces_existing_product() {
        let store = InMemoryProductStore::default();
        store.insert(product("p-1", "Rice", 1)).await;
        let mut updated = product("p-1", "Rice", 1);
        updated.stocks_left = 9;
        store.insert(updated).await;

        let stocks = store.stocks_for(&ProductId("p-1".to_string())).await.expect("stocks");
        assert_eq!(stocks, Some(9));
    }
}
