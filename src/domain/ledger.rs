use serde::Serialize;
use thiserror::Error;

use super::{parse_amount, Transaction, TransactionId, TransactionKind};

/// Expense ceiling used when no budget limit is configured.
pub const DEFAULT_BUDGET_LIMIT: f64 = 2_250_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Category,
    Amount,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Category => write!(f, "category"),
            Field::Amount => write!(f, "amount"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("All fields must be filled: {0} is empty")]
    EmptyField(Field),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Invalid transaction type: {0:?} (expected Income or Expense)")]
    InvalidKind(String),

    #[error("Totals out of range: amounts too large to add up")]
    TotalsOutOfRange,

    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),
}

/// Aggregates over the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

impl Totals {
    /// Totals after one more entry, or `None` if income, expense or balance
    /// would stop being a finite number.
    pub fn with_entry(&self, amount: f64, kind: TransactionKind) -> Option<Totals> {
        let (income, expense) = match kind {
            TransactionKind::Income => (self.income + amount, self.expense),
            TransactionKind::Expense => (self.income, self.expense + amount),
        };
        let balance = income - expense;

        (income.is_finite() && expense.is_finite() && balance.is_finite()).then_some(Totals {
            income,
            expense,
            balance,
        })
    }

    /// Totals over `transactions` in order, or `None` if they overflow.
    pub fn checked_sum<'a, I>(transactions: I) -> Option<Totals>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .try_fold(Totals::default(), |totals, t| totals.with_entry(t.amount, t.kind))
    }
}

/// Advisory raised when total expenses go over the budget limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub expense: f64,
    pub limit: f64,
}

impl BudgetAlert {
    /// Returns an alert when expenses are strictly greater than `limit`.
    pub fn check(totals: &Totals, limit: f64) -> Option<Self> {
        (totals.expense > limit).then_some(Self {
            expense: totals.expense,
            limit,
        })
    }

    pub fn overrun(&self) -> f64 {
        self.expense - self.limit
    }
}

/// Ordered, in-memory collection of transactions.
/// Insertion order is preserved and duplicate values are allowed.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the raw inputs and append a new transaction.
    /// The ledger is left untouched on error.
    pub fn add(
        &mut self,
        category: &str,
        amount: &str,
        kind: TransactionKind,
    ) -> Result<Transaction, LedgerError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(LedgerError::EmptyField(Field::Category));
        }
        if amount.trim().is_empty() {
            return Err(LedgerError::EmptyField(Field::Amount));
        }
        let amount = parse_amount(amount)?;
        if self.totals().with_entry(amount, kind).is_none() {
            return Err(LedgerError::TotalsOutOfRange);
        }

        let transaction = Transaction::new(category, amount, kind);
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    pub fn remove(&mut self, id: TransactionId) -> Result<Transaction, LedgerError> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        Ok(self.transactions.remove(index))
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Swap the whole sequence, returning the previous one.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        std::mem::replace(&mut self.transactions, transactions)
    }

    /// Entries whose category equals `text` ignoring case; every entry when
    /// `text` is blank. Never matches on substrings.
    pub fn filter_by_category<'a>(
        &'a self,
        text: &str,
    ) -> impl Iterator<Item = &'a Transaction> + use<'a> {
        let needle = text.trim().to_lowercase();
        self.transactions
            .iter()
            .filter(move |t| needle.is_empty() || t.category_matches(&needle))
    }

    pub fn totals(&self) -> Totals {
        let (income, expense) =
            self.transactions
                .iter()
                .fold((0.0, 0.0), |(income, expense), t| match t.kind {
                    TransactionKind::Income => (income + t.amount, expense),
                    TransactionKind::Expense => (income, expense + t.amount),
                });

        Totals {
            income,
            expense,
            balance: income - expense,
        }
    }

    /// Distinct category labels in first-seen order, compared ignoring case.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<String> = Vec::new();
        let mut categories = Vec::new();
        for t in &self.transactions {
            let key = t.category.to_lowercase();
            if !seen.contains(&key) {
                seen.push(key);
                categories.push(t.category.as_str());
            }
        }
        categories
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add("Salary", "500000", TransactionKind::Income).unwrap();
        ledger.add("Rent", "200000", TransactionKind::Expense).unwrap();
        ledger.add("Rent-extra", "1500", TransactionKind::Expense).unwrap();
        ledger.add("rent", "100", TransactionKind::Expense).unwrap();
        ledger
    }

    #[test]
    fn test_add_appends_in_order() {
        let ledger = sample_ledger();
        let categories: Vec<&str> = ledger.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["Salary", "Rent", "Rent-extra", "rent"]);
    }

    #[test]
    fn test_add_trims_category() {
        let mut ledger = Ledger::new();
        let t = ledger.add("  Food ", "12.5", TransactionKind::Expense).unwrap();
        assert_eq!(t.category, "Food");
        assert_eq!(t.amount, 12.5);
    }

    #[test]
    fn test_add_rejects_empty_fields() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.add("", "10", TransactionKind::Income),
            Err(LedgerError::EmptyField(Field::Category))
        );
        assert_eq!(
            ledger.add("   ", "10", TransactionKind::Income),
            Err(LedgerError::EmptyField(Field::Category))
        );
        assert_eq!(
            ledger.add("Food", "", TransactionKind::Income),
            Err(LedgerError::EmptyField(Field::Amount))
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_add_rejects_invalid_amount() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.add("Food", "ten", TransactionKind::Expense),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_add_rejects_amounts_that_overflow_totals() {
        let mut ledger = Ledger::new();
        ledger.add("Yacht", "1e308", TransactionKind::Expense).unwrap();

        assert_eq!(
            ledger.add("Jet", "1e308", TransactionKind::Expense),
            Err(LedgerError::TotalsOutOfRange)
        );
        // income stays finite but the balance would not
        assert_eq!(
            ledger.add("Refund", "-1e308", TransactionKind::Income),
            Err(LedgerError::TotalsOutOfRange)
        );
        assert_eq!(ledger.len(), 1);
        assert!(ledger.totals().balance.is_finite());
    }

    #[test]
    fn test_checked_sum() {
        let ledger = sample_ledger();
        assert_eq!(Totals::checked_sum(ledger.iter()), Some(ledger.totals()));

        let huge = vec![
            Transaction::new("A", 1e308, TransactionKind::Income),
            Transaction::new("B", 1e308, TransactionKind::Income),
        ];
        assert_eq!(Totals::checked_sum(&huge), None);
    }

    #[test]
    fn test_remove_by_id() {
        let mut ledger = sample_ledger();
        let rent_id = ledger.iter().nth(1).unwrap().id;

        let removed = ledger.remove(rent_id).unwrap();
        assert_eq!(removed.category, "Rent");
        assert_eq!(ledger.len(), 3);
        assert!(ledger.get(rent_id).is_none());

        assert_eq!(ledger.remove(rent_id), Err(LedgerError::NotFound(rent_id)));
    }

    #[test]
    fn test_remove_only_removes_the_selected_duplicate() {
        let mut ledger = Ledger::new();
        let first = ledger.add("Coffee", "3", TransactionKind::Expense).unwrap();
        let second = ledger.add("Coffee", "3", TransactionKind::Expense).unwrap();

        ledger.remove(second.id).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.iter().next().unwrap().id, first.id);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(Ledger::new().totals(), Totals::default());
    }

    #[test]
    fn test_totals_mixed() {
        let totals = sample_ledger().totals();
        assert_eq!(totals.income, 500000.0);
        assert_eq!(totals.expense, 201600.0);
        assert_eq!(totals.balance, totals.income - totals.expense);
    }

    #[test]
    fn test_filter_blank_returns_everything() {
        let ledger = sample_ledger();
        assert_eq!(ledger.filter_by_category("").count(), 4);
        assert_eq!(ledger.filter_by_category("   ").count(), 4);
    }

    #[test]
    fn test_filter_is_exact_and_case_insensitive() {
        let ledger = sample_ledger();
        let matches: Vec<&str> = ledger
            .filter_by_category(" RENT ")
            .map(|t| t.category.as_str())
            .collect();
        assert_eq!(matches, vec!["Rent", "rent"]);
    }

    #[test]
    fn test_filter_is_restartable() {
        let ledger = sample_ledger();
        let first: Vec<TransactionId> = ledger.filter_by_category("salary").map(|t| t.id).collect();
        let second: Vec<TransactionId> = ledger.filter_by_category("salary").map(|t| t.id).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_categories_first_seen() {
        assert_eq!(sample_ledger().categories(), vec!["Salary", "Rent", "Rent-extra"]);
    }

    #[test]
    fn test_budget_alert_threshold() {
        let under = Totals {
            income: 0.0,
            expense: DEFAULT_BUDGET_LIMIT,
            balance: -DEFAULT_BUDGET_LIMIT,
        };
        assert!(BudgetAlert::check(&under, DEFAULT_BUDGET_LIMIT).is_none());

        let over = Totals {
            income: 0.0,
            expense: 3_000_000.0,
            balance: -3_000_000.0,
        };
        let alert = BudgetAlert::check(&over, DEFAULT_BUDGET_LIMIT).unwrap();
        assert_eq!(alert.overrun(), 750_000.0);
    }

    #[test]
    fn test_replace_all_returns_previous() {
        let mut ledger = sample_ledger();
        let previous = ledger.replace_all(vec![Transaction::new(
            "Gift",
            50.0,
            TransactionKind::Income,
        )]);
        assert_eq!(previous.len(), 4);
        assert_eq!(ledger.len(), 1);
    }
}
