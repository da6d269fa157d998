use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::LedgerError;

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money coming in (salary, refunds, gifts)
    Income,
    /// Money going out
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(LedgerError::InvalidKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded income or expense.
///
/// The id is assigned when the record enters a ledger and only lives for the
/// session; the persisted file carries category, amount and kind only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub category: String,
    pub amount: f64,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(category: impl Into<String>, amount: f64, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            amount,
            kind,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Field-wise comparison that ignores the session id.
    pub fn same_entry(&self, other: &Transaction) -> bool {
        self.category == other.category && self.amount == other.amount && self.kind == other.kind
    }

    /// `needle` must already be lower-cased.
    pub(crate) fn category_matches(&self, needle: &str) -> bool {
        self.category.to_lowercase() == needle
    }
}
