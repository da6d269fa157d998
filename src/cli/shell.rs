use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

use crate::application::LedgerService;
use crate::domain::{parse_amount, TransactionKind};

use super::view::{render_summary, render_table, TableView};
use super::{report_load, select_rows};

const HELP: &str = "\
Commands:
  add <category> <amount> [income|expense]   record a transaction (default: income)
  delete <row>...                            delete rows of the last table shown
  filter [category]                          show one category, or everything when blank
  list                                       show the current table
  totals                                     show income, expenses and balance
  categories                                 list known categories
  save                                       write the ledger to the file
  load                                       replace the ledger with the file contents
  help                                       show this message
  quit                                       leave (unsaved changes are lost)";

enum Flow {
    Continue,
    Quit,
}

/// Interactive session over a ledger service. Every change is rendered by a
/// subscribed [`TableView`]; command feedback goes to `out`.
pub struct Shell<W: Write> {
    service: LedgerService,
    out: W,
}

/// Run a session until `quit` or end of input. Tables are rendered to
/// `view_out`, everything else to `out`.
pub fn run_shell<R, W, V>(service: LedgerService, input: R, out: W, view_out: V) -> Result<()>
where
    R: BufRead,
    W: Write,
    V: Write + 'static,
{
    let mut shell = Shell::new(service, out);
    shell.service.subscribe(TableView::new(view_out));
    shell.run(input)
}

impl<W: Write> Shell<W> {
    pub fn new(service: LedgerService, out: W) -> Self {
        Self { service, out }
    }

    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        writeln!(
            self.out,
            "Personal Finance Tracker - ledger file: {} (type 'load' to open it, 'help' for commands)",
            self.service.repository().path().display()
        )?;
        self.prompt()?;

        for line in input.lines() {
            let line = line.context("Failed to read input")?;
            match self.execute(line.trim()) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => writeln!(self.out, "Error: {:#}", e)?,
            }
            self.prompt()?;
        }

        if self.service.has_unsaved_changes() {
            writeln!(
                self.out,
                "Unsaved changes were not written to {}",
                self.service.repository().path().display()
            )?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()?;
        Ok(())
    }

    fn execute(&mut self, line: &str) -> Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        let args: Vec<&str> = words.collect();

        match command.to_lowercase().as_str() {
            "add" => {
                let (category, amount, kind) = parse_add_args(&args);
                self.service.add_transaction(&category, amount, kind)?;
            }
            "delete" | "del" => {
                let rows = parse_rows(&args)?;
                let ids = select_rows(&self.service.visible(), &rows)?;
                let removed = self.service.delete_selected(&ids)?;
                writeln!(self.out, "Deleted {} transaction(s)", removed.len())?;
            }
            "filter" => {
                self.service.filter(&args.join(" "));
            }
            "list" | "ls" => {
                render_table(&mut self.out, self.service.visible())?;
            }
            "totals" => {
                render_summary(&mut self.out, &self.service.summary())?;
            }
            "categories" => {
                let categories = self.service.ledger().categories();
                if categories.is_empty() {
                    writeln!(self.out, "No categories yet.")?;
                } else {
                    writeln!(self.out, "{}", categories.join(", "))?;
                }
            }
            "save" => {
                let count = self.service.save()?;
                writeln!(
                    self.out,
                    "Transactions saved successfully! ({} written to {})",
                    count,
                    self.service.repository().path().display()
                )?;
            }
            "load" => {
                let report = self.service.load()?;
                report_load(&mut self.out, &report)?;
            }
            "help" | "?" => writeln!(self.out, "{}", HELP)?,
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            other => bail!("Unknown command '{}'. Type 'help' for a list of commands.", other),
        }

        Ok(Flow::Continue)
    }
}

/// Split `add` arguments from the right: an optional kind, then the amount,
/// and whatever remains is the category (which may contain spaces). A single
/// remaining word that is not a number is the category, so the missing
/// amount gets reported.
fn parse_add_args<'a>(args: &[&'a str]) -> (String, &'a str, TransactionKind) {
    let mut args = args.to_vec();
    let kind = match args.last().map(|word| word.parse::<TransactionKind>()) {
        Some(Ok(kind)) => {
            args.pop();
            kind
        }
        _ => TransactionKind::Income,
    };
    if let [word] = args.as_slice() {
        if parse_amount(word).is_err() {
            return (word.to_string(), "", kind);
        }
    }
    let amount = args.pop().unwrap_or("");
    (args.join(" "), amount, kind)
}

fn parse_rows(args: &[&str]) -> Result<Vec<usize>> {
    args.iter()
        .map(|arg| {
            arg.parse::<usize>()
                .with_context(|| format!("Invalid row number '{}'", arg))
        })
        .collect()
}
