use serde::Serialize;

use crate::domain::{
    BudgetAlert, Ledger, LedgerError, Totals, Transaction, TransactionId, TransactionKind,
};
use crate::settings::Settings;
use crate::storage::{MalformedRecord, Repository};

use super::{AppError, LedgerChange, LedgerObserver, LedgerSnapshot};

/// Application service providing the user-facing ledger operations.
/// This is the primary interface for any front end (CLI, shell, ...).
pub struct LedgerService {
    ledger: Ledger,
    repo: Repository,
    budget_limit: f64,
    filter: Option<String>,
    dirty: bool,
    observers: Vec<Box<dyn LedgerObserver>>,
}

/// Totals together with the budget check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub totals: Totals,
    pub budget_limit: f64,
    pub alert: Option<BudgetAlert>,
}

/// Result of loading the ledger file
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub malformed: Vec<MalformedRecord>,
}

impl LedgerService {
    /// Create a service with an empty ledger.
    pub fn new(repo: Repository, budget_limit: f64) -> Self {
        Self {
            ledger: Ledger::new(),
            repo,
            budget_limit,
            filter: None,
            dirty: false,
            observers: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Repository::new(settings.ledger_path.clone()),
            settings.budget_limit,
        )
    }

    /// Register an observer notified after every change.
    pub fn subscribe(&mut self, observer: impl LedgerObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn active_filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// True when the ledger changed since the last save or load.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ========================
    // Mutations
    // ========================

    /// Validate and record a new transaction.
    pub fn add_transaction(
        &mut self,
        category: &str,
        amount: &str,
        kind: TransactionKind,
    ) -> Result<Transaction, AppError> {
        let transaction = self.ledger.add(category, amount, kind)?;
        tracing::info!(
            category = %transaction.category,
            amount = transaction.amount,
            kind = %transaction.kind,
            "transaction added"
        );

        self.dirty = true;
        self.notify(LedgerChange::Added);
        Ok(transaction)
    }

    /// Delete the selected transactions. Either all of them are removed or,
    /// if any id is unknown or the remaining totals would overflow, none is.
    pub fn delete_selected(
        &mut self,
        ids: &[TransactionId],
    ) -> Result<Vec<Transaction>, AppError> {
        if ids.is_empty() {
            return Err(AppError::NoSelection);
        }

        let mut selection: Vec<TransactionId> = Vec::with_capacity(ids.len());
        for &id in ids {
            if self.ledger.get(id).is_none() {
                return Err(LedgerError::NotFound(id).into());
            }
            if !selection.contains(&id) {
                selection.push(id);
            }
        }

        // Removing entries can un-cancel large opposite amounts
        let remaining = self.ledger.iter().filter(|t| !selection.contains(&t.id));
        if Totals::checked_sum(remaining).is_none() {
            return Err(LedgerError::TotalsOutOfRange.into());
        }

        let mut removed = Vec::with_capacity(selection.len());
        for id in selection {
            removed.push(self.ledger.remove(id)?);
        }
        tracing::info!(count = removed.len(), "transactions deleted");

        self.dirty = true;
        self.notify(LedgerChange::Removed);
        Ok(removed)
    }

    // ========================
    // Queries
    // ========================

    /// Show only entries of the given category; blank text shows everything.
    /// Returns the number of visible rows.
    pub fn filter(&mut self, text: &str) -> usize {
        let text = text.trim();
        self.filter = (!text.is_empty()).then(|| text.to_string());
        tracing::debug!(filter = text, "filter applied");

        self.notify(LedgerChange::Filtered);
        self.visible().len()
    }

    /// The current projection of the ledger, with the active filter applied.
    pub fn visible(&self) -> Vec<&Transaction> {
        self.ledger
            .filter_by_category(self.filter.as_deref().unwrap_or(""))
            .collect()
    }

    pub fn totals(&self) -> Totals {
        self.ledger.totals()
    }

    /// Recompute totals and check them against the budget limit.
    pub fn summary(&self) -> Summary {
        let totals = self.ledger.totals();
        let alert = BudgetAlert::check(&totals, self.budget_limit);
        if let Some(alert) = &alert {
            tracing::warn!(
                expense = alert.expense,
                limit = alert.limit,
                "expenses exceed budget limit"
            );
        }

        Summary {
            totals,
            budget_limit: self.budget_limit,
            alert,
        }
    }

    // ========================
    // Persistence
    // ========================

    /// Write the whole ledger to the repository file.
    pub fn save(&mut self) -> Result<usize, AppError> {
        let count = self.repo.save_transactions(self.ledger.as_slice())?;
        tracing::info!(count, path = %self.repo.path().display(), "ledger saved");

        self.dirty = false;
        Ok(count)
    }

    /// Replace the ledger with the file contents. Malformed rows are skipped
    /// and reported; a missing file leaves the ledger untouched.
    pub fn load(&mut self) -> Result<LoadReport, AppError> {
        let loaded = self
            .repo
            .load_transactions()?
            .ok_or_else(|| AppError::FileNotFound(self.repo.path().to_path_buf()))?;

        for record in &loaded.malformed {
            tracing::warn!("skipping malformed row, {}", record);
        }

        let report = LoadReport {
            loaded: loaded.transactions.len(),
            malformed: loaded.malformed,
        };
        self.ledger.replace_all(loaded.transactions);
        self.filter = None;
        self.dirty = false;
        tracing::info!(
            count = report.loaded,
            skipped = report.malformed.len(),
            path = %self.repo.path().display(),
            "ledger loaded"
        );

        self.notify(LedgerChange::Loaded);
        Ok(report)
    }

    /// Like `load`, but a missing file counts as an empty ledger.
    pub fn load_or_empty(&mut self) -> Result<LoadReport, AppError> {
        match self.load() {
            Err(AppError::FileNotFound(path)) => {
                tracing::debug!(path = %path.display(), "no ledger file yet, starting empty");
                Ok(LoadReport::default())
            }
            other => other,
        }
    }

    fn notify(&mut self, change: LedgerChange) {
        let (totals, alert) = if change.recomputes_totals() {
            let summary = self.summary();
            (summary.totals, summary.alert)
        } else {
            (self.ledger.totals(), None)
        };

        if self.observers.is_empty() {
            return;
        }

        let snapshot = LedgerSnapshot {
            change,
            rows: self.visible().into_iter().cloned().collect(),
            totals,
            alert,
            filter: self.filter.clone(),
        };
        for observer in &mut self.observers {
            observer.on_ledger_changed(&snapshot);
        }
    }
}
