mod common;

use std::fs;
use std::io::Cursor;

use anyhow::Result;
use common::{ledger_path, service_at, SharedBuffer};
use fintrack::cli::run_shell;
use tempfile::TempDir;

/// Run a scripted session and return everything it printed.
fn run_script(temp: &TempDir, script: &str) -> Result<String> {
    let service = service_at(ledger_path(temp));
    let out = SharedBuffer::default();
    run_shell(service, Cursor::new(script.to_string()), out.clone(), out.clone())?;
    Ok(out.contents())
}

#[test]
fn test_add_renders_table_and_totals() -> Result<()> {
    let temp = TempDir::new()?;

    let output = run_script(
        &temp,
        "add Salary 500000 income\nadd Rent 200000 expense\nquit\n",
    )?;

    assert!(output.contains("Salary"));
    assert!(output.contains("Total Income:   500000.0"));
    assert!(output.contains("Total Expenses: 200000.0"));
    assert!(output.contains("Balance:        300000.0"));
    assert!(!output.contains("Budget Alert"));
    Ok(())
}

#[test]
fn test_errors_do_not_end_the_session() -> Result<()> {
    let temp = TempDir::new()?;

    let output = run_script(
        &temp,
        "add Food abc expense\ndelete\nfrobnicate\nadd Food 12 expense\nquit\n",
    )?;

    assert!(output.contains("Error: Invalid amount: \"abc\""));
    assert!(output.contains("Error: No transaction selected"));
    assert!(output.contains("Error: Unknown command 'frobnicate'"));
    assert!(output.contains("Total Expenses: 12.0"));
    Ok(())
}

#[test]
fn test_add_without_amount_blames_the_amount() -> Result<()> {
    let temp = TempDir::new()?;

    let output = run_script(&temp, "add Salary income
add Rent
quit
")?;

    assert_eq!(
        output
            .matches("Error: All fields must be filled: amount is empty")
            .count(),
        2
    );
    assert!(!output.contains("category is empty"));
    Ok(())
}

#[test]
fn test_save_failure_is_reported_and_session_continues() -> Result<()> {
    let temp = TempDir::new()?;
    fs::create_dir(ledger_path(&temp))?;

    let output = run_script(&temp, "add Salary 100
save
totals
quit
")?;

    let error_at = output
        .find("Error: Storage error:")
        .expect("save error should be printed");
    assert!(output[error_at..].contains("Total Income:   100.0"));
    assert!(output.contains("Unsaved changes were not written"));
    Ok(())
}

#[test]
fn test_nothing_is_written_until_save() -> Result<()> {
    let temp = TempDir::new()?;

    let output = run_script(&temp, "add Salary 100\n")?;

    assert!(!ledger_path(&temp).exists());
    assert!(output.contains("Unsaved changes were not written"));
    Ok(())
}

#[test]
fn test_save_and_load_through_the_shell() -> Result<()> {
    let temp = TempDir::new()?;

    run_script(&temp, "add Car repair 300 expense\nadd Salary 1000\nsave\nquit\n")?;
    let contents = fs::read_to_string(ledger_path(&temp))?;
    assert_eq!(
        contents,
        "Category,Amount,Type\nCar repair,300.0,Expense\nSalary,1000.0,Income\n"
    );

    let output = run_script(&temp, "load\ntotals\nquit\n")?;
    assert!(output.contains("Loaded 2 transaction(s)"));
    assert!(output.contains("Balance:        700.0"));
    Ok(())
}

#[test]
fn test_load_without_file_reports_error() -> Result<()> {
    let temp = TempDir::new()?;

    let output = run_script(&temp, "load\nquit\n")?;

    assert!(output.contains("Error: No saved transactions found at"));
    Ok(())
}

#[test]
fn test_delete_uses_rows_of_filtered_table() -> Result<()> {
    let temp = TempDir::new()?;

    run_script(
        &temp,
        "add Rent 1000 expense\nadd Food 20 expense\nadd rent 5 expense\n\
         filter RENT\ndelete 2\nfilter\nsave\nquit\n",
    )?;

    let contents = fs::read_to_string(ledger_path(&temp))?;
    assert_eq!(
        contents,
        "Category,Amount,Type\nRent,1000.0,Expense\nFood,20.0,Expense\n"
    );
    Ok(())
}

#[test]
fn test_budget_alert_is_printed() -> Result<()> {
    let temp = TempDir::new()?;

    let output = run_script(
        &temp,
        "add Car 1000000 expense\nadd Tuition 1000000 expense\nadd Roof 1000000 expense\nquit\n",
    )?;

    assert_eq!(output.matches("Budget Alert").count(), 1);
    assert!(output.contains("exceed the budget limit of 2250000.0 by 750000.0"));
    Ok(())
}
