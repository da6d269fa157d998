mod amount;
mod ledger;
mod transaction;

pub use amount::*;
pub use ledger::*;
pub use transaction::*;
