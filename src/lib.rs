pub mod application;
pub mod cli;
pub mod domain;
pub mod settings;
pub mod storage;

pub use application::LedgerService;
pub use domain::*;
pub use settings::Settings;
pub use storage::Repository;
