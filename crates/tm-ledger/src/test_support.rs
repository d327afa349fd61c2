//! Shared fixtures for ledger unit tests.

use crate::connection::{LedgerConnection, LedgerRow};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tm_core::{ConnectionConfig, LedgerConfig};
use tm_platform::{DuckDbPlatform, SqlServerPlatform};

pub(crate) fn duckdb_platform() -> DuckDbPlatform {
    DuckDbPlatform::new(
        ConnectionConfig::new("localhost", "helpdesk"),
        &LedgerConfig::default(),
    )
}

pub(crate) fn sqlserver_platform() -> SqlServerPlatform {
    SqlServerPlatform::new(
        ConnectionConfig::new("db.internal", "helpdesk"),
        &LedgerConfig::default(),
    )
}

pub(crate) fn memory_db() -> duckdb::Connection {
    duckdb::Connection::open_in_memory().unwrap()
}

/// Connection that records every statement and replays scripted answers.
#[derive(Default)]
pub(crate) struct RecordingConnection {
    pub statements: RefCell<Vec<String>>,
    pub integers: RefCell<VecDeque<Option<i64>>>,
    pub strings: RefCell<VecDeque<Option<String>>>,
    pub rows: RefCell<Vec<LedgerRow>>,
    pub affected: RefCell<VecDeque<usize>>,
    pub failure: RefCell<Option<Arc<dyn Error + Send + Sync>>>,
}

/// Error returned by a failing [`RecordingConnection`], wrapping the
/// scripted driver error as its source.
#[derive(Debug)]
pub(crate) struct DriverFailure(Arc<dyn Error + Send + Sync>);

impl fmt::Display for DriverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for DriverFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.0)
    }
}

impl RecordingConnection {
    pub fn with_integers(values: &[Option<i64>]) -> Self {
        let conn = Self::default();
        conn.integers.borrow_mut().extend(values.iter().copied());
        conn
    }

    pub fn failing(message: &str) -> Self {
        Self::failing_with(std::io::Error::other(message.to_string()))
    }

    pub fn failing_with(err: impl Error + Send + Sync + 'static) -> Self {
        let conn = Self::default();
        *conn.failure.borrow_mut() = Some(Arc::new(err));
        conn
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }

    fn record(&self, sql: &str) -> Result<(), DriverFailure> {
        self.statements.borrow_mut().push(sql.to_string());
        match self.failure.borrow().as_ref() {
            Some(err) => Err(DriverFailure(Arc::clone(err))),
            None => Ok(()),
        }
    }
}

impl LedgerConnection for RecordingConnection {
    type Error = DriverFailure;

    fn execute_batch(&self, sql: &str) -> Result<(), Self::Error> {
        self.record(sql)
    }

    fn execute(&self, sql: &str) -> Result<usize, Self::Error> {
        self.record(sql)?;
        Ok(self.affected.borrow_mut().pop_front().unwrap_or(1))
    }

    fn query_i64(&self, sql: &str) -> Result<Option<i64>, Self::Error> {
        self.record(sql)?;
        Ok(self.integers.borrow_mut().pop_front().flatten())
    }

    fn query_string(&self, sql: &str) -> Result<Option<String>, Self::Error> {
        self.record(sql)?;
        Ok(self.strings.borrow_mut().pop_front().flatten())
    }

    fn query_rows(&self, sql: &str) -> Result<Vec<LedgerRow>, Self::Error> {
        self.record(sql)?;
        Ok(self.rows.borrow().clone())
    }
}

pub(crate) fn ledger_row(sequence_id: i64, version: &str, status: &str) -> LedgerRow {
    LedgerRow {
        sequence_id,
        version: version.to_string(),
        applied_on_epoch_ms: 1_700_000_000_000,
        applied_by_user: "deploy".to_string(),
        applied_by_tool: "tidemark".to_string(),
        applied_by_tool_version: "0.1.0".to_string(),
        status: status.to_string(),
        duration_ms: 12,
        failed_script_path: None,
        failed_script_error: None,
        additional_artifacts: None,
    }
}
