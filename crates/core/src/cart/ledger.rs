use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::money::{self, MoneyError};
use crate::domain::product::{Product, ProductId, SellerId};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CartError {
    #[error("invalid price for product `{}`: {source}", product_id.0)]
    InvalidPrice {
        product_id: ProductId,
        #[source]
        source: MoneyError,
    },
}

/// One cart line. Always satisfies `current_price == price_per_unit * qty`
/// and `minimum_order_quantity <= qty <= stocks_left` (stock bound enforced
/// whenever the stock figure is meaningful, i.e. at or above the minimum).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub price_per_unit: Decimal,
    pub qty: u32,
    pub current_price: Decimal,
    pub minimum_order_quantity: u32,
    pub stocks_left: u32,
}

impl CartLine {
    /// Single derivation point for a committed line. The total is recomputed
    /// from its inputs here and nowhere else, so a line that fails to derive
    /// is never stored.
    fn derive(
        product_id: ProductId,
        seller_id: SellerId,
        price_per_unit: Decimal,
        qty: u32,
        minimum_order_quantity: u32,
        stocks_left: u32,
    ) -> Result<Self, CartError> {
        let current_price = money::line_total(price_per_unit, qty).map_err(|source| {
            CartError::InvalidPrice { product_id: product_id.clone(), source }
        })?;
        Ok(Self {
            product_id,
            seller_id,
            price_per_unit,
            qty,
            current_price,
            minimum_order_quantity,
            stocks_left,
        })
    }
}

/// Keeps a quantity inside `[minimum, stock]`. When the stock figure sits
/// below the minimum order quantity the minimum wins; such a line cannot
/// satisfy both bounds and the order-quantity contract takes precedence.
fn bounded_qty(requested: u32, minimum_order_quantity: u32, stocks_left: u32) -> u32 {
    let floor = minimum_order_quantity.max(1);
    let ceiling = stocks_left.max(floor);
    requested.clamp(floor, ceiling)
}

/// In-memory cart for a single session, keyed by product id with insertion
/// order preserved for display.
///
/// Every mutation derives the candidate line first and commits only when the
/// derived price is valid; a failed derivation leaves the ledger exactly as
/// it was.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartLedger {
    lines: Vec<CartLine>,
}

impl CartLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|line| &line.product_id == product_id)
    }

    /// Adds a product to the cart, merging quantities when a line for it
    /// already exists.
    ///
    /// `qty` defaults to the product's minimum order quantity (itself
    /// defaulting to 1). The price passes through the coercion boundary; a
    /// price that does not coerce rejects the whole operation.
    pub fn add_or_merge(
        &mut self,
        product: &Product,
        qty: Option<u32>,
    ) -> Result<&CartLine, CartError> {
        let price_per_unit = money::coerce_price(product.price_per_unit).map_err(|source| {
            CartError::InvalidPrice { product_id: product.id.clone(), source }
        })?;
        let requested = qty.unwrap_or(product.minimum_order_quantity.max(1));

        match self.position(&product.id) {
            Some(index) => {
                let existing = &self.lines[index];
                let merged = bounded_qty(
                    existing.qty.saturating_add(requested),
                    existing.minimum_order_quantity,
                    existing.stocks_left,
                );
                let line = CartLine::derive(
                    existing.product_id.clone(),
                    existing.seller_id.clone(),
                    existing.price_per_unit,
                    merged,
                    existing.minimum_order_quantity,
                    existing.stocks_left,
                )?;
                self.lines[index] = line;
                Ok(&self.lines[index])
            }
            None => {
                let bounded = bounded_qty(
                    requested,
                    product.minimum_order_quantity,
                    product.stocks_left,
                );
                let line = CartLine::derive(
                    product.id.clone(),
                    product.seller_id.clone(),
                    price_per_unit,
                    bounded,
                    product.minimum_order_quantity.max(1),
                    product.stocks_left,
                )?;
                let index = self.lines.len();
                self.lines.push(line);
                Ok(&self.lines[index])
            }
        }
    }

    /// Raises the quantity by one unless the line is already at its stock
    /// ceiling. Absent lines and ceiling hits are no-ops, not errors.
    pub fn increment(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        let Some(index) = self.position(product_id) else {
            return Ok(());
        };
        let existing = &self.lines[index];
        if existing.qty >= existing.stocks_left {
            return Ok(());
        }
        let line = CartLine::derive(
            existing.product_id.clone(),
            existing.seller_id.clone(),
            existing.price_per_unit,
            existing.qty + 1,
            existing.minimum_order_quantity,
            existing.stocks_left,
        )?;
        self.lines[index] = line;
        Ok(())
    }

    /// Lowers the quantity by one unless the line is already at its minimum
    /// order quantity. Absent lines and floor hits are no-ops, not errors.
    pub fn decrement(&mut self, product_id: &ProductId) -> Result<(), CartError> {
        let Some(index) = self.position(product_id) else {
            return Ok(());
        };
        let existing = &self.lines[index];
        if existing.qty <= existing.minimum_order_quantity.max(1) {
            return Ok(());
        }
        let line = CartLine::derive(
            existing.product_id.clone(),
            existing.seller_id.clone(),
            existing.price_per_unit,
            existing.qty - 1,
            existing.minimum_order_quantity,
            existing.stocks_left,
        )?;
        self.lines[index] = line;
        Ok(())
    }

    /// Deletes the line; absent lines are fine (idempotent).
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
    }

    /// Empties the whole cart, e.g. after successful order submission.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Applies a fresh stock figure to a line, lowering the quantity if it
    /// now exceeds the ceiling.
    pub fn refresh_stock(
        &mut self,
        product_id: &ProductId,
        stocks_left: u32,
    ) -> Result<(), CartError> {
        let Some(index) = self.position(product_id) else {
            return Ok(());
        };
        let existing = &self.lines[index];
        let qty = bounded_qty(existing.qty, existing.minimum_order_quantity, stocks_left);
        let line = CartLine::derive(
            existing.product_id.clone(),
            existing.seller_id.clone(),
            existing.price_per_unit,
            qty,
            existing.minimum_order_quantity,
            stocks_left,
        )?;
        self.lines[index] = line;
        Ok(())
    }

    /// Ordered copy of the current lines for display or order submission.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.current_price).sum()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
