use thiserror::Error;
use tracing::warn;

use crate::catalog::store::{ProductStore, StoreError};
use crate::domain::coordinate::Coordinate;
use crate::domain::product::Product;
use crate::geo;

/// Baseline page size used by catalog callers.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug, PartialEq)]
pub struct PageRequest {
    pub category: String,
    /// 1-indexed page number.
    pub page: u32,
    pub page_size: u32,
    pub buyer: Coordinate,
}

/// One fetched page, partitioned by deliverability relative to the buyer.
///
/// Every classified input product lands in exactly one of the two sequences,
/// in fetch order. Products without a usable location are excluded from both
/// and surface only through `excluded_without_location`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CatalogPage {
    pub deliverable: Vec<Product>,
    pub non_deliverable: Vec<Product>,
    pub has_more: bool,
    pub excluded_without_location: usize,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CatalogFetchError {
    #[error("invalid page request: {0}")]
    InvalidRequest(String),
    #[error("catalog fetch failed for category `{category}` page {page} (page size {page_size})")]
    Store {
        category: String,
        page: u32,
        page_size: u32,
        #[source]
        source: StoreError,
    },
}

/// Fetches one catalog page and partitions it by deliverability.
pub struct CatalogPageFetcher<S> {
    store: S,
}

impl<S> CatalogPageFetcher<S>
where
    S: ProductStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Retrieves page `request.page` of `request.category`, newest first, and
    /// splits it into deliverable and non-deliverable sequences.
    ///
    /// `has_more` is derived from the store's total match count against
    /// `page * page_size`; partitioning and location exclusions never change
    /// how many further pages exist. Store failures propagate carrying the
    /// request that failed; no retries happen here.
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<CatalogPage, CatalogFetchError> {
        if request.page == 0 {
            return Err(CatalogFetchError::InvalidRequest("page numbers start at 1".to_string()));
        }
        if request.page_size == 0 {
            return Err(CatalogFetchError::InvalidRequest(
                "page size must be positive".to_string(),
            ));
        }

        let offset = (request.page - 1).saturating_mul(request.page_size);
        let queried = self
            .store
            .products_by_category(&request.category, offset, request.page_size)
            .await
            .map_err(|source| CatalogFetchError::Store {
                category: request.category.clone(),
                page: request.page,
                page_size: request.page_size,
                source,
            })?;

        let has_more =
            queried.total_matching > u64::from(request.page) * u64::from(request.page_size);

        let mut page = CatalogPage { has_more, ..CatalogPage::default() };
        for product in queried.items {
            let Some(location) = product.location else {
                page.excluded_without_location += 1;
                warn!(
                    event_name = "catalog.product_location_missing",
                    product_id = %product.id.0,
                    category = %request.category,
                    "product has no usable location; excluded from partitioning"
                );
                continue;
            };

            let classification = geo::classify(request.buyer, location, product.delivery_radius_km);
            if classification.deliverable {
                page.deliverable.push(product);
            } else {
                page.non_deliverable.push(product);
            }
        }

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use super::{CatalogFetchError, CatalogPageFetcher, PageRequest};
    use crate::catalog::store::{ProductQueryPage, ProductStore, StoreError};
    use crate::domain::coordinate::Coordinate;
    use crate::domain::product::{Product, ProductId, SellerId};

    struct FixedStore {
        page: Result<ProductQueryPage, StoreError>,
    }

    #[async_trait]
    impl ProductStore for FixedStore {
        async fn products_by_category(
            &self,
            _category: &str,
            _offset: u32,
            _limit: u32,
        ) -> Result<ProductQueryPage, StoreError> {
            self.page.clone()
        }

        async fn stocks_for(&self, _id: &ProductId) -> Result<Option<u32>, StoreError> {
            Ok(None)
        }

        async fn products_by_seller(
            &self,
            _seller_id: &SellerId,
        ) -> Result<Vec<Product>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn buyer() -> Coordinate {
        Coordinate::new(78.96, 20.59).expect("valid buyer coordinate")
    }

    fn product(id: &str, latitude_offset: f64, delivery_radius_km: f64) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: format!("product {id}"),
            image: String::new(),
            brand: "Verma Farms".to_string(),
            measuring_unit: "kg".to_string(),
            price_per_unit: 82.5,
            minimum_order_quantity: 1,
            stocks_left: 40,
            location: Some(
                Coordinate::new(78.96, 20.59 + latitude_offset).expect("valid product coordinate"),
            ),
            delivery_radius_km,
            seller_id: SellerId("s-1".to_string()),
            category: "Rice".to_string(),
            listed_at: Utc::now(),
        }
    }

    fn request(page: u32) -> PageRequest {
        PageRequest { category: "Rice".to_string(), page, page_size: 50, buyer: buyer() }
    }

    #[tokio::test]
    async fn partitions_every_located_product_into_exactly_one_sequence() {
        // 0.027 degrees of latitude is ~3 km; 0.09 is ~10 km.
        let near = product("p-near", 0.027, 5.0);
        let far = product("p-far", 0.09, 5.0);
        let store = FixedStore {
            page: Ok(ProductQueryPage { items: vec![near.clone(), far.clone()], total_matching: 2 }),
        };
        let fetcher = CatalogPageFetcher::new(store);

        let page = fetcher.fetch_page(&request(1)).await.expect("fetch page");

        assert_eq!(page.deliverable, vec![near]);
        assert_eq!(page.non_deliverable, vec![far]);
        assert_eq!(page.excluded_without_location, 0);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn preserves_fetch_order_within_each_sequence() {
        let items = vec![
            product("p-1", 0.01, 5.0),
            product("p-2", 0.5, 5.0),
            product("p-3", 0.02, 5.0),
            product("p-4", 0.6, 5.0),
        ];
        let store = FixedStore { page: Ok(ProductQueryPage { items, total_matching: 4 }) };
        let fetcher = CatalogPageFetcher::new(store);

        let page = fetcher.fetch_page(&request(1)).await.expect("fetch page");

        let deliverable_ids: Vec<&str> =
            page.deliverable.iter().map(|p| p.id.0.as_str()).collect();
        let non_deliverable_ids: Vec<&str> =
            page.non_deliverable.iter().map(|p| p.id.0.as_str()).collect();
        assert_eq!(deliverable_ids, ["p-1", "p-3"]);
        assert_eq!(non_deliverable_ids, ["p-2", "p-4"]);
    }

    #[tokio::test]
    async fn counts_products_without_location_instead_of_dropping_silently() {
        let mut unlocated = product("p-unlocated", 0.0, 5.0);
        unlocated.location = None;
        let located = product("p-located", 0.01, 5.0);
        let store = FixedStore {
            page: Ok(ProductQueryPage { items: vec![unlocated, located], total_matching: 2 }),
        };
        let fetcher = CatalogPageFetcher::new(store);

        let page = fetcher.fetch_page(&request(1)).await.expect("fetch page");

        assert_eq!(page.excluded_without_location, 1);
        assert_eq!(page.deliverable.len() + page.non_deliverable.len(), 1);
    }

    #[tokio::test]
    async fn has_more_reflects_total_count_not_partition_sizes() {
        let mut unlocated = product("p-unlocated", 0.0, 5.0);
        unlocated.location = None;
        let store = FixedStore {
            page: Ok(ProductQueryPage { items: vec![unlocated], total_matching: 120 }),
        };
        let fetcher = CatalogPageFetcher::new(store);

        let page = fetcher.fetch_page(&request(1)).await.expect("fetch page");
        assert!(page.has_more, "50 of 120 seen, more pages must exist");

        let page_three = fetcher.fetch_page(&request(3)).await.expect("fetch page 3");
        assert!(!page_three.has_more, "page 3 covers offset 100..150 >= 120");
    }

    #[tokio::test]
    async fn stale_count_extra_page_is_a_graceful_empty_page() {
        let store =
            FixedStore { page: Ok(ProductQueryPage { items: Vec::new(), total_matching: 100 }) };
        let fetcher = CatalogPageFetcher::new(store);

        let page = fetcher.fetch_page(&request(3)).await.expect("fetch page");
        assert!(page.deliverable.is_empty());
        assert!(page.non_deliverable.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn store_failure_propagates_with_request_context() {
        let store = FixedStore { page: Err(StoreError::Unavailable("connection reset".into())) };
        let fetcher = CatalogPageFetcher::new(store);

        let error = fetcher.fetch_page(&request(2)).await.expect_err("store failure");
        assert!(matches!(
            error,
            CatalogFetchError::Store { ref category, page: 2, page_size: 50, .. }
                if category == "Rice"
        ));
    }

    #[tokio::test]
    async fn rejects_zero_page_and_zero_page_size() {
        let store = FixedStore {
            page: Ok(ProductQueryPage { items: Vec::new(), total_matching: 0 }),
        };
        let fetcher = CatalogPageFetcher::new(store);

        let mut zero_page = request(0);
        zero_page.page = 0;
        assert!(matches!(
            fetcher.fetch_page(&zero_page).await,
            Err(CatalogFetchError::InvalidRequest(_))
        ));

        let mut zero_size = request(1);
        zero_size.page_size = 0;
        assert!(matches!(
            fetcher.fetch_page(&zero_size).await,
            Err(CatalogFetchError::InvalidRequest(_))
        ));
    }
}
