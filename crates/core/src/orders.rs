use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::cart::ledger::{CartLedger, CartLine};
use crate::domain::coordinate::Coordinate;
use crate::domain::product::{ProductId, SellerId};

/// One entry of an order submission, as consumed by the order gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub order_qty: u32,
    pub order_location: Coordinate,
    pub seller_id: SellerId,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OrderSubmitError {
    #[error("order gateway unavailable: {0}")]
    Unavailable(String),
    #[error("order rejected: {0}")]
    Rejected(String),
}

/// Order submission collaborator. Consumed by the cart flow, not owned by it.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, lines: &[OrderLine]) -> Result<(), OrderSubmitError>;
}

/// Maps a cart snapshot to order lines for the given delivery location.
pub fn order_lines(snapshot: &[CartLine], order_location: Coordinate) -> Vec<OrderLine> {
    snapshot
        .iter()
        .map(|line| OrderLine {
            product_id: line.product_id.clone(),
            order_qty: line.qty,
            order_location,
            seller_id: line.seller_id.clone(),
        })
        .collect()
}

/// Submits the ledger's current snapshot and clears the cart on success.
///
/// An empty cart submits nothing and succeeds. A gateway failure leaves the
/// cart intact so the buyer can retry.
pub async fn submit_order<G>(
    gateway: &G,
    ledger: &mut CartLedger,
    order_location: Coordinate,
) -> Result<usize, OrderSubmitError>
where
    G: OrderGateway,
{
    let lines = order_lines(&ledger.snapshot(), order_location);
    if lines.is_empty() {
        return Ok(0);
    }

    gateway.submit(&lines).await?;
    ledger.clear();
    info!(
        event_name = "orders.submitted",
        line_count = lines.len(),
        "order submitted; cart cleared"
    );
    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::{order_lines, submit_order, OrderGateway, OrderLine, OrderSubmitError};
    use crate::cart::ledger::CartLedger;
    use crate::domain::coordinate::Coordinate;
    use crate::domain::product::{Product, ProductId, SellerId};

    #[derive(Default)]
    struct RecordingGateway {
        submissions: Mutex<Vec<Vec<OrderLine>>>,
        fail: bool,
    }

    #[async_trait]
    impl OrderGateway for RecordingGateway {
        async fn submit(&self, lines: &[OrderLine]) -> Result<(), OrderSubmitError> {
            if self.fail {
                return Err(OrderSubmitError::Unavailable("gateway down".to_string()));
            }
            self.submissions.lock().expect("lock").push(lines.to_vec());
            Ok(())
        }
    }

    fn location() -> Coordinate {
        Coordinate::new(78.96, 20.59).expect("valid coordinate")
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: format!("product {id}"),
            image: String::new(),
            brand: String::new(),
            measuring_unit: "kg".to_string(),
            price_per_unit: 40.0,
            minimum_order_quantity: 1,
            stocks_left: 10,
            location: Some(location()),
            delivery_radius_km: 25.0,
            seller_id: SellerId(format!("s-{id}")),
            category: "Rice".to_string(),
            listed_at: Utc::now(),
        }
    }

    #[test]
    fn maps_snapshot_to_order_lines() {
        let mut ledger = CartLedger::new();
        ledger.add_or_merge(&product("p-1"), Some(3)).expect("add");

        let lines = order_lines(&ledger.snapshot(), location());

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].order_qty, 3);
        assert_eq!(lines[0].seller_id.0, "s-p-1");
        assert_eq!(lines[0].order_location, location());
    }

    #[tokio::test]
    async fn successful_submission_clears_the_cart() {
        let gateway = RecordingGateway::default();
        let mut ledger = CartLedger::new();
        ledger.add_or_merge(&product("p-1"), Some(2)).expect("add");
        ledger.add_or_merge(&product("p-2"), Some(1)).expect("add");

        let submitted = submit_order(&gateway, &mut ledger, location()).await.expect("submit");

        assert_eq!(submitted, 2);
        assert!(ledger.is_empty());
        assert_eq!(gateway.submissions.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_leaves_the_cart_intact() {
        let gateway = RecordingGateway { fail: true, ..RecordingGateway::default() };
        let mut ledger = CartLedger::new();
        ledger.add_or_merge(&product("p-1"), Some(2)).expect("add");

        let error = submit_order(&gateway, &mut ledger, location()).await.expect_err("failure");

        assert!(matches!(error, OrderSubmitError::Unavailable(_)));
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn empty_cart_submits_nothing() {
        let gateway = RecordingGateway::default();
        let mut ledger = CartLedger::new();

        let submitted = submit_order(&gateway, &mut ledger, location()).await.expect("submit");

        assert_eq!(submitted, 0);
        assert!(gateway.submissions.lock().expect("lock").is_empty());
    }
}
