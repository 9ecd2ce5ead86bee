use crate::commands::{self, CommandResult, ErrorClass};
use farmlink_core::catalog::accumulator::{CatalogAccumulator, CatalogContext};
use farmlink_core::catalog::fetcher::{CatalogFetchError, CatalogPageFetcher, PageRequest};
use farmlink_core::domain::coordinate::Coordinate;
use farmlink_db::SqlProductStore;

pub struct BrowseArgs {
    pub category: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub page_size: Option<u32>,
    pub max_pages: Option<u32>,
}

struct BrowseOutput {
    pages_fetched: u32,
    deliverable: usize,
    non_deliverable: usize,
    excluded_without_location: usize,
    exhausted: bool,
}

/// Drives the full fetch, partition, accumulate pipeline over one category
/// from a single buyer position.
pub fn run(args: BrowseArgs) -> CommandResult {
    let config = match commands::require_config("browse") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let longitude = args.longitude.unwrap_or(config.catalog.default_longitude);
    let latitude = args.latitude.unwrap_or(config.catalog.default_latitude);
    let buyer = match Coordinate::new(longitude, latitude) {
        Ok(buyer) => buyer,
        Err(error) => {
            return CommandResult::failure(
                "browse",
                ErrorClass::InvalidLocation,
                format!("buyer location ({longitude}, {latitude}) rejected: {error}"),
            );
        }
    };
    let page_size = args.page_size.unwrap_or(config.catalog.page_size);

    let category = args.category.clone();
    let max_pages = args.max_pages;
    let result = commands::with_pool(&config, |pool| async move {
        let fetcher = CatalogPageFetcher::new(SqlProductStore::new(pool));
        let mut accumulator =
            CatalogAccumulator::new(CatalogContext { category: category.clone(), buyer });
        let mut pages_fetched = 0u32;
        let mut excluded_without_location = 0usize;

        while !accumulator.end_of_results() {
            if max_pages.is_some_and(|limit| pages_fetched >= limit) {
                break;
            }

            let ticket = accumulator.begin_fetch();
            let page = fetcher
                .fetch_page(&PageRequest {
                    category: category.clone(),
                    page: ticket.page(),
                    page_size,
                    buyer,
                })
                .await
                .map_err(|error| match &error {
                    CatalogFetchError::InvalidRequest(_) => {
                        (ErrorClass::InvalidRequest, error.to_string())
                    }
                    CatalogFetchError::Store { .. } => {
                        (ErrorClass::CatalogQuery, error.to_string())
                    }
                })?;
            excluded_without_location += page.excluded_without_location;
            accumulator.append_page(ticket, &page);
            pages_fetched += 1;
        }

        Ok(BrowseOutput {
            pages_fetched,
            deliverable: accumulator.deliverable().len(),
            non_deliverable: accumulator.non_deliverable().len(),
            excluded_without_location,
            exhausted: accumulator.end_of_results(),
        })
    });

    match result {
        Ok(output) => {
            let coverage = if output.exhausted { "all results" } else { "partial results" };
            let message = format!(
                "browsed `{}` from ({longitude}, {latitude}): {} deliverable, {} non-deliverable, {} without location, across {} pages ({coverage})",
                args.category,
                output.deliverable,
                output.non_deliverable,
                output.excluded_without_location,
                output.pages_fetched,
            );
            CommandResult::success("browse", message)
        }
        Err((class, message)) => CommandResult::failure("browse", class, message),
    }
}
