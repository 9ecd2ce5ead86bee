pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod geo;
pub mod orders;

pub use analytics::{
    sales_by_category, sales_by_date, CategorySales, DateSales, SalesRecord, PRODUCT_CATEGORIES,
};
pub use cart::ledger::{CartError, CartLedger, CartLine};
pub use cart::money::MoneyError;
pub use catalog::accumulator::{
    AppendOutcome, CatalogAccumulator, CatalogContext, CatalogSnapshot, FetchTicket,
};
pub use catalog::fetcher::{
    CatalogFetchError, CatalogPage, CatalogPageFetcher, PageRequest, DEFAULT_PAGE_SIZE,
};
pub use catalog::store::{ProductQueryPage, ProductStore, StoreError};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::coordinate::{Coordinate, CoordinateError};
pub use domain::product::{Product, ProductId, SellerId};
pub use geo::{classify, distance_km, Classification};
pub use orders::{order_lines, submit_order, OrderGateway, OrderLine, OrderSubmitError};
