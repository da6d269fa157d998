use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::domain::{
    format_amount, parse_amount, LedgerError, Totals, Transaction, TransactionKind,
};

use super::CSV_HEADER;

/// A data row that could not be turned into a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecord {
    /// 1-based line number in the file (the header is line 1)
    pub line: u64,
    pub field: Option<String>,
    pub error: String,
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "line {} ({}): {}", self.line, field, self.error),
            None => write!(f, "line {}: {}", self.line, self.error),
        }
    }
}

/// Everything read back from a ledger file.
#[derive(Debug, Clone, Default)]
pub struct LoadedTransactions {
    pub transactions: Vec<Transaction>,
    pub malformed: Vec<MalformedRecord>,
}

/// Repository persisting the ledger as a comma-separated file.
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every transaction to the file, replacing whatever was there.
    /// Missing parent directories are created.
    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<usize> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create ledger file: {}", self.path.display()))?;
        write_transactions(file, transactions)
            .with_context(|| format!("Failed to write ledger file: {}", self.path.display()))
    }

    /// Read the file back. Returns `None` when it does not exist.
    pub fn load_transactions(&self) -> Result<Option<LoadedTransactions>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open ledger file: {}", self.path.display())
                });
            }
        };

        read_transactions(file)
            .map(Some)
            .with_context(|| format!("Failed to read ledger file: {}", self.path.display()))
    }
}

/// Write the header and one row per transaction.
pub fn write_transactions<W: Write>(writer: W, transactions: &[Transaction]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    let mut count = 0;
    for transaction in transactions {
        csv_writer.write_record([
            transaction.category.as_str(),
            format_amount(transaction.amount).as_str(),
            transaction.kind.as_str(),
        ])?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

/// Read rows after the header. Rows that fail validation are collected in
/// `malformed` instead of aborting the whole read.
pub fn read_transactions<R: Read>(reader: R) -> Result<LoadedTransactions> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut loaded = LoadedTransactions::default();
    let mut totals = Totals::default();

    for (index, result) in csv_reader.records().enumerate() {
        // Fallback when the reader has no position: +2 for header and 0-indexing
        let fallback_line = index as u64 + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                loaded.malformed.push(MalformedRecord {
                    line: e.position().map_or(fallback_line, |p| p.line()),
                    field: None,
                    error: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };

        let line = record.position().map_or(fallback_line, |p| p.line());
        let transaction = match parse_record(&record, line) {
            Ok(transaction) => transaction,
            Err(malformed) => {
                loaded.malformed.push(malformed);
                continue;
            }
        };

        match totals.with_entry(transaction.amount, transaction.kind) {
            Some(next) => {
                totals = next;
                loaded.transactions.push(transaction);
            }
            None => loaded.malformed.push(MalformedRecord {
                line,
                field: Some(CSV_HEADER[1].to_string()),
                error: LedgerError::TotalsOutOfRange.to_string(),
            }),
        }
    }

    Ok(loaded)
}

fn parse_record(record: &csv::StringRecord, line: u64) -> Result<Transaction, MalformedRecord> {
    let malformed = |field: Option<&str>, error: String| MalformedRecord {
        line,
        field: field.map(str::to_string),
        error,
    };

    if record.len() != CSV_HEADER.len() {
        return Err(malformed(
            None,
            format!(
                "expected {} fields, found {}",
                CSV_HEADER.len(),
                record.len()
            ),
        ));
    }

    let category = record[0].trim();
    if category.is_empty() {
        return Err(malformed(Some(CSV_HEADER[0]), "category is empty".to_string()));
    }

    let amount = parse_amount(&record[1])
        .map_err(|e| malformed(Some(CSV_HEADER[1]), e.to_string()))?;

    let kind = record[2]
        .parse::<TransactionKind>()
        .map_err(|e| malformed(Some(CSV_HEADER[2]), e.to_string()))?;

    Ok(Transaction::new(category, amount, kind))
}
