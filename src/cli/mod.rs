mod shell;
mod view;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::application::{LedgerService, LoadReport, Summary};
use crate::domain::{format_amount, Transaction, TransactionId, TransactionKind};
use crate::settings::Settings;

pub use shell::{run_shell, Shell};
pub use view::{render_alert, render_summary, render_table, render_totals, TableView};

/// Fintrack - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Record income and expenses, track totals against a budget, keep them in a CSV file")]
#[command(version)]
pub struct Cli {
    /// Ledger file path (default: transactions.csv)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Expense limit above which a budget alert is shown (default: 2250000)
    #[arg(long, global = true)]
    pub budget_limit: Option<f64>,

    /// Configuration file (TOML, default: fintrack.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a transaction
    Add {
        /// Category label (e.g., "Salary", "Rent")
        category: String,

        /// Amount (e.g., "500000" or "12.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Transaction type: income, expense
        #[arg(short, long, default_value = "income")]
        kind: String,
    },

    /// Delete transactions by row number, as shown by `list`
    Delete {
        /// Row numbers to delete
        rows: Vec<usize>,

        /// Row numbers refer to the list filtered by this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List transactions
    List {
        /// Only show this category (exact match, ignoring case)
        #[arg(short, long)]
        category: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show total income, expenses and balance
    Totals {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Start an interactive session (nothing is written until `save`)
    Shell,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    transactions: Vec<&'a Transaction>,
    #[serde(flatten)]
    summary: Summary,
}

impl Cli {
    /// Resolve settings from the config file and environment, then apply
    /// command line overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings =
            Settings::load(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(file) = &self.file {
            settings.ledger_path = file.clone();
        }
        if let Some(limit) = self.budget_limit {
            settings.budget_limit = limit;
        }
        if self.verbose {
            settings.log_level = "debug".to_string();
        }
        Ok(settings)
    }

    pub fn run(self, settings: &Settings) -> Result<()> {
        let mut service = LedgerService::from_settings(settings);

        match self.command {
            Commands::Shell => {
                let stdin = io::stdin();
                run_shell(service, stdin.lock(), io::stdout(), io::stdout())?;
            }

            Commands::Add {
                category,
                amount,
                kind,
            } => {
                let kind: TransactionKind = kind.parse()?;
                open_for_update(&mut service)?;

                let transaction = service.add_transaction(&category, &amount, kind)?;
                service.save()?;

                println!(
                    "Recorded {}: {} {}",
                    transaction.kind,
                    transaction.category,
                    format_amount(transaction.amount)
                );
                if let Some(alert) = service.summary().alert {
                    render_alert(&mut io::stdout(), &alert)?;
                }
            }

            Commands::Delete { rows, category } => {
                open_for_update(&mut service)?;
                service.filter(category.as_deref().unwrap_or(""));

                let ids = select_rows(&service.visible(), &rows)?;
                let removed = service.delete_selected(&ids)?;
                service.save()?;

                for t in &removed {
                    println!(
                        "Deleted {}: {} {}",
                        t.kind,
                        t.category,
                        format_amount(t.amount)
                    );
                }
            }

            Commands::List { category, format } => {
                open_for_read(&mut service)?;
                service.filter(category.as_deref().unwrap_or(""));

                let mut out = io::stdout();
                match format.as_str() {
                    "table" => {
                        render_table(&mut out, service.visible())?;
                        writeln!(out)?;
                        render_summary(&mut out, &service.summary())?;
                    }
                    "json" => {
                        let output = ListOutput {
                            transactions: service.visible(),
                            summary: service.summary(),
                        };
                        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
                    }
                    other => bail!("Unknown format '{}'. Valid formats: table, json", other),
                }
            }

            Commands::Totals { format } => {
                open_for_read(&mut service)?;
                let summary = service.summary();

                let mut out = io::stdout();
                match format.as_str() {
                    "table" => render_summary(&mut out, &summary)?,
                    "json" => writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?,
                    other => bail!("Unknown format '{}'. Valid formats: table, json", other),
                }
            }
        }

        Ok(())
    }
}

/// Map 1-based row numbers of a rendered table to transaction ids.
pub fn select_rows(visible: &[&Transaction], rows: &[usize]) -> Result<Vec<TransactionId>> {
    rows.iter()
        .map(|&row| {
            row.checked_sub(1)
                .and_then(|index| visible.get(index))
                .map(|t| t.id)
                .ok_or_else(|| {
                    anyhow!(
                        "Row {} does not exist (the table has {} rows)",
                        row,
                        visible.len()
                    )
                })
        })
        .collect()
}

/// Write a short account of a load, including every skipped row.
pub fn report_load<W: Write>(out: &mut W, report: &LoadReport) -> io::Result<()> {
    writeln!(out, "Loaded {} transaction(s)", report.loaded)?;
    if !report.malformed.is_empty() {
        writeln!(out, "Skipped {} malformed row(s):", report.malformed.len())?;
        for record in &report.malformed {
            writeln!(out, "  {}", record)?;
        }
    }
    Ok(())
}

fn open_for_read(service: &mut LedgerService) -> Result<LoadReport> {
    let report = service.load_or_empty()?;
    if !report.malformed.is_empty() {
        report_load(&mut io::stderr(), &report)?;
    }
    Ok(report)
}

// Saving after a partial load would silently drop the skipped rows.
fn open_for_update(service: &mut LedgerService) -> Result<()> {
    let report = open_for_read(service)?;
    if !report.malformed.is_empty() {
        bail!(
            "{} has {} malformed row(s); fix them before changing the ledger",
            service.repository().path().display(),
            report.malformed.len()
        );
    }
    Ok(())
}
