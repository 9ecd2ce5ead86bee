use std::collections::HashSet;

use tracing::debug;

use crate::catalog::fetcher::CatalogPage;
use crate::domain::coordinate::Coordinate;
use crate::domain::product::{Product, ProductId};

/// The geography and category an accumulator is currently collecting for.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogContext {
    pub category: String,
    pub buyer: Coordinate,
}

/// Correlation token minted when a fetch is initiated.
///
/// A response is applied only if its ticket still matches the accumulator's
/// epoch and expected page; anything minted before a reset, or arriving out
/// of order, is discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
    page: u32,
}

impl FetchTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    Applied { added_deliverable: usize, added_non_deliverable: usize },
    /// The ticket was minted before a reset; the response belongs to a
    /// different geography or category and is dropped.
    StaleEpoch,
    /// The response arrived out of order relative to the page cursor.
    StalePage,
    /// End of results was already reached; appends are idempotent no-ops.
    AlreadyComplete,
}

/// Point-in-time copy of the accumulated catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogSnapshot {
    pub deliverable: Vec<Product>,
    pub non_deliverable: Vec<Product>,
    pub cursor: u32,
    pub end_of_results: bool,
}

/// Merges successive catalog pages into two de-duplicated, order-preserving
/// sequences for a single browsing session.
///
/// De-duplication is keyed on product identity across the union of both
/// sequences, so a re-delivered page (transient retry, list/map toggle)
/// never duplicates a row.
#[derive(Debug)]
pub struct CatalogAccumulator {
    context: CatalogContext,
    epoch: u64,
    cursor: u32,
    end_of_results: bool,
    deliverable: Vec<Product>,
    non_deliverable: Vec<Product>,
    seen: HashSet<ProductId>,
}

impl CatalogAccumulator {
    pub fn new(context: CatalogContext) -> Self {
        Self {
            context,
            epoch: 0,
            cursor: 1,
            end_of_results: false,
            deliverable: Vec::new(),
            non_deliverable: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Clears both sequences, returns the cursor to 1, clears the
    /// end-of-results flag, and invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.cursor = 1;
        self.end_of_results = false;
        self.deliverable.clear();
        self.non_deliverable.clear();
        self.seen.clear();
    }

    /// Switches to a new buyer location or category.
    ///
    /// A context change always resets; an unchanged context leaves the
    /// accumulated state (and in-flight tickets) intact.
    pub fn retarget(&mut self, context: CatalogContext) {
        if self.context != context {
            debug!(
                event_name = "catalog.context_changed",
                category = %context.category,
                "catalog context changed; resetting accumulated state"
            );
            self.context = context;
            self.reset();
        }
    }

    /// Mints the correlation ticket for the next page fetch.
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket { epoch: self.epoch, page: self.cursor }
    }

    /// Applies one fetched page if its ticket is still current.
    pub fn append_page(&mut self, ticket: FetchTicket, page: &CatalogPage) -> AppendOutcome {
        if self.end_of_results {
            return AppendOutcome::AlreadyComplete;
        }
        if ticket.epoch != self.epoch {
            debug!(
                event_name = "catalog.stale_response_discarded",
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "discarding response from a previous geography or category"
            );
            return AppendOutcome::StaleEpoch;
        }
        if ticket.page != self.cursor {
            debug!(
                event_name = "catalog.out_of_order_response_discarded",
                ticket_page = ticket.page,
                expected_page = self.cursor,
                "discarding out-of-order page response"
            );
            return AppendOutcome::StalePage;
        }

        let added_deliverable = append_unique(&mut self.deliverable, &mut self.seen, &page.deliverable);
        let added_non_deliverable =
            append_unique(&mut self.non_deliverable, &mut self.seen, &page.non_deliverable);

        self.cursor += 1;
        self.end_of_results = !page.has_more;

        AppendOutcome::Applied { added_deliverable, added_non_deliverable }
    }

    pub fn context(&self) -> &CatalogContext {
        &self.context
    }

    pub fn deliverable(&self) -> &[Product] {
        &self.deliverable
    }

    pub fn non_deliverable(&self) -> &[Product] {
        &self.non_deliverable
    }

    /// 1-indexed page the next fetch should request.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn end_of_results(&self) -> bool {
        self.end_of_results
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            deliverable: self.deliverable.clone(),
            non_deliverable: self.non_deliverable.clone(),
            cursor: self.cursor,
            end_of_results: self.end_of_results,
        }
    }
}

fn append_unique(
    target: &mut Vec<Product>,
    seen: &mut HashSet<ProductId>,
    incoming: &[Product],
) -> usize {
    let mut added = 0;
    for product in incoming {
        if seen.insert(product.id.clone()) {
            target.push(product.clone());
            added += 1;
        }
    }
    added
}
