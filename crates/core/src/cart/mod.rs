pub mod ledger;
pub mod money;

pub use ledger::{CartError, CartLedger, CartLine};
pub use money::MoneyError;
