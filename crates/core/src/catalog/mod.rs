pub mod accumulator;
pub mod fetcher;
pub mod store;

pub use accumulator::{
    AppendOutcome, CatalogAccumulator, CatalogContext, CatalogSnapshot, FetchTicket,
};
pub use fetcher::{CatalogFetchError, CatalogPage, CatalogPageFetcher, PageRequest};
pub use store::{ProductQueryPage, ProductStore, StoreError};
