use std::io::{self, Write};

use crate::application::{LedgerChange, LedgerObserver, LedgerSnapshot, Summary};
use crate::domain::{format_amount, BudgetAlert, Totals, Transaction};

/// Renders the ledger table and totals whenever the ledger changes.
pub struct TableView<W: Write> {
    out: W,
}

impl<W: Write> TableView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn render(&mut self, snapshot: &LedgerSnapshot) -> io::Result<()> {
        if let Some(filter) = &snapshot.filter {
            writeln!(self.out, "Filter: {}", filter)?;
        }
        render_table(&mut self.out, snapshot.rows.iter())?;

        // Filtering only changes the rows, totals stay as last printed
        if snapshot.change != LedgerChange::Filtered {
            writeln!(self.out)?;
            render_totals(&mut self.out, &snapshot.totals)?;
            if let Some(alert) = &snapshot.alert {
                render_alert(&mut self.out, alert)?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> LedgerObserver for TableView<W> {
    fn on_ledger_changed(&mut self, snapshot: &LedgerSnapshot) {
        if let Err(e) = self.render(snapshot) {
            tracing::error!("failed to render ledger: {e}");
        }
    }
}

/// Print rows numbered from 1; the numbers are what `delete` accepts.
pub fn render_table<'a, W, I>(out: &mut W, rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        return writeln!(out, "No transactions found.");
    }

    writeln!(out, "{:>4}  {:<24} {:>15}  {:<8}", "#", "CATEGORY", "AMOUNT", "TYPE")?;
    writeln!(out, "{}", "-".repeat(55))?;
    for (index, t) in rows.enumerate() {
        writeln!(
            out,
            "{:>4}  {:<24} {:>15}  {:<8}",
            index + 1,
            t.category,
            format_amount(t.amount),
            t.kind.as_str()
        )?;
    }
    Ok(())
}

pub fn render_totals<W: Write>(out: &mut W, totals: &Totals) -> io::Result<()> {
    writeln!(out, "Total Income:   {}", format_amount(totals.income))?;
    writeln!(out, "Total Expenses: {}", format_amount(totals.expense))?;
    writeln!(out, "Balance:        {}", format_amount(totals.balance))
}

pub fn render_alert<W: Write>(out: &mut W, alert: &BudgetAlert) -> io::Result<()> {
    writeln!(
        out,
        "Budget Alert: expenses {} exceed the budget limit of {} by {}",
        format_amount(alert.expense),
        format_amount(alert.limit),
        format_amount(alert.overrun())
    )
}

pub fn render_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    render_totals(out, &summary.totals)?;
    if let Some(alert) = &summary.alert {
        render_alert(out, alert)?;
    }
    Ok(())
}
