// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use fintrack::application::{LedgerObserver, LedgerService, LedgerSnapshot};
use fintrack::domain::DEFAULT_BUDGET_LIMIT;
use fintrack::storage::Repository;
use tempfile::TempDir;

/// Helper to create a service backed by a file in a temporary directory
pub fn test_service() -> (LedgerService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let service = service_at(ledger_path(&temp_dir));
    (service, temp_dir)
}

pub fn service_at(path: PathBuf) -> LedgerService {
    LedgerService::new(Repository::new(path), DEFAULT_BUDGET_LIMIT)
}

pub fn ledger_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("transactions.csv")
}

/// Observer that keeps every snapshot it receives
#[derive(Clone, Default)]
pub struct Recorder {
    snapshots: Rc<RefCell<Vec<LedgerSnapshot>>>,
}

impl Recorder {
    pub fn snapshots(&self) -> Vec<LedgerSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn last(&self) -> Option<LedgerSnapshot> {
        self.snapshots.borrow().last().cloned()
    }
}

impl LedgerObserver for Recorder {
    fn on_ledger_changed(&mut self, snapshot: &LedgerSnapshot) {
        self.snapshots.borrow_mut().push(snapshot.clone());
    }
}

/// In-memory writer that can be handed out more than once
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.bytes.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
