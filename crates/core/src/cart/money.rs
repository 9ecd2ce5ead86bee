use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("amount is not a finite number")]
    NotFinite,
    #[error("amount {0} has no exact decimal representation")]
    NotRepresentable(f64),
    #[error("amount {0} is negative")]
    Negative(Decimal),
    #[error("derived price overflows the decimal range")]
    Overflow,
}

/// The single coercion boundary between raw float payloads and committed
/// cart money. Everything the ledger stores as a price passes through here.
pub fn coerce_price(value: f64) -> Result<Decimal, MoneyError> {
    if !value.is_finite() {
        return Err(MoneyError::NotFinite);
    }
    let amount = Decimal::from_f64(value).ok_or(MoneyError::NotRepresentable(value))?;
    if amount.is_sign_negative() {
        return Err(MoneyError::Negative(amount));
    }
    Ok(amount)
}

/// Derives a line total, failing instead of committing an overflowed price.
pub fn line_total(price_per_unit: Decimal, qty: u32) -> Result<Decimal, MoneyError> {
    price_per_unit.checked_mul(Decimal::from(qty)).ok_or(MoneyError::Overflow)
}
