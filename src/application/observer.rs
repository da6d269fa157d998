use crate::domain::{BudgetAlert, Totals, Transaction};

/// What triggered a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    Added,
    Removed,
    Filtered,
    Loaded,
}

impl LedgerChange {
    /// Filtering only changes the view; everything else recomputes totals
    /// and re-evaluates the budget.
    pub fn recomputes_totals(self) -> bool {
        !matches!(self, LedgerChange::Filtered)
    }
}

/// State handed to observers after every change.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub change: LedgerChange,
    /// Rows to display, with the active filter applied
    pub rows: Vec<Transaction>,
    /// Totals over the whole ledger, regardless of the filter
    pub totals: Totals,
    pub alert: Option<BudgetAlert>,
    pub filter: Option<String>,
}

pub trait LedgerObserver {
    fn on_ledger_changed(&mut self, snapshot: &LedgerSnapshot);
}

impl<F> LedgerObserver for F
where
    F: FnMut(&LedgerSnapshot),
{
    fn on_ledger_changed(&mut self, snapshot: &LedgerSnapshot) {
        self(snapshot)
    }
}
