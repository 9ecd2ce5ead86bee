use thiserror::Error;

use farmlink_core::catalog::store::StoreError;
use farmlink_core::orders::OrderSubmitError;

pub mod memory;
pub mod order;
pub mod product;

pub use memory::InMemoryProductStore;
pub use order::SqlOrderGateway;
pub use product::SqlProductStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

impl From<RepositoryError> for OrderSubmitError {
    fn from(error: RepositoryError) -> Self {
        Self::Unavailable(error.to_string())
    }
}
