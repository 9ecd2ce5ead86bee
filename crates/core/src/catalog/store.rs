use async_trait::async_trait;
use thiserror::Error;

use crate::domain::product::{Product, ProductId, SellerId};

/// One page of category-matching products plus the total match count.
///
/// `items` are ordered newest first; `total_matching` counts every product in
/// the category, not just the returned window.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductQueryPage {
    pub items: Vec<Product>,
    pub total_matching: u64,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("product store unavailable: {0}")]
    Unavailable(String),
}

/// Catalog query collaborator consumed by the page fetcher.
///
/// Implementations must return consistent (not necessarily linearizable)
/// counts; a stale count that produces one extra empty page is acceptable.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn products_by_category(
        &self,
        category: &str,
        offset: u32,
        limit: u32,
    ) -> Result<ProductQueryPage, StoreError>;

    /// Current stock for a single product, if it still exists.
    async fn stocks_for(&self, id: &ProductId) -> Result<Option<u32>, StoreError>;

    /// Every product listed by one seller, newest first.
    async fn products_by_seller(&self, seller_id: &SellerId)
        -> Result<Vec<Product>, StoreError>;
}
