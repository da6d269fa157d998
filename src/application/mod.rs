// Application layer: use cases on top of the domain ledger and the CSV
// repository. Front ends (the CLI and the interactive shell) only talk to
// LedgerService and receive updates through LedgerObserver.

pub mod error;
pub mod observer;
pub mod service;

pub use error::*;
pub use observer::*;
pub use service::*;
