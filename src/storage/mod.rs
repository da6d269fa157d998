mod repository;

pub use repository::*;

/// Header row written at the top of every ledger file.
pub const CSV_HEADER: [&str; 3] = ["Category", "Amount", "Type"];
