use std::path::PathBuf;
use thiserror::Error;

use crate::domain::LedgerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("No transaction selected")]
    NoSelection,

    #[error("No saved transactions found at {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors caused by what the user typed, as opposed to I/O.
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::Ledger(_) | AppError::NoSelection)
    }
}
