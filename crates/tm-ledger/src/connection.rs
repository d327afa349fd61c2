//! Connection seam between the ledger and a database driver.
//!
//! The ledger runs against one connection supplied by the caller for a whole
//! migration run. It never opens, closes, or pools connections and never
//! begins or commits transactions.

use duckdb::Connection;

/// One ledger row as returned by the records query, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub sequence_id: i64,
    pub version: String,
    pub applied_on_epoch_ms: i64,
    pub applied_by_user: String,
    pub applied_by_tool: String,
    pub applied_by_tool_version: String,
    pub status: String,
    pub duration_ms: i64,
    pub failed_script_path: Option<String>,
    pub failed_script_error: Option<String>,
    pub additional_artifacts: Option<String>,
}

/// Synchronous statement execution against the ledger's database.
pub trait LedgerConnection {
    /// Native driver error
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one or more statements, discarding results.
    fn execute_batch(&self, sql: &str) -> Result<(), Self::Error>;

    /// Run one statement, returning the number of affected rows.
    fn execute(&self, sql: &str) -> Result<usize, Self::Error>;

    /// First column of the first row as an integer; `None` for no row or NULL.
    fn query_i64(&self, sql: &str) -> Result<Option<i64>, Self::Error>;

    /// First column of the first row as text; `None` for no row or NULL.
    fn query_string(&self, sql: &str) -> Result<Option<String>, Self::Error>;

    /// All rows of the records query.
    fn query_rows(&self, sql: &str) -> Result<Vec<LedgerRow>, Self::Error>;
}

impl LedgerConnection for Connection {
    type Error = duckdb::Error;

    fn execute_batch(&self, sql: &str) -> Result<(), Self::Error> {
        Connection::execute_batch(self, sql)
    }

    fn execute(&self, sql: &str) -> Result<usize, Self::Error> {
        Connection::execute(self, sql, [])
    }

    fn query_i64(&self, sql: &str) -> Result<Option<i64>, Self::Error> {
        let mut stmt = self.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let value = match rows.next()? {
            Some(row) => row.get::<_, Option<i64>>(0)?,
            None => None,
        };
        Ok(value)
    }

    fn query_string(&self, sql: &str) -> Result<Option<String>, Self::Error> {
        let mut stmt = self.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let value = match rows.next()? {
            Some(row) => row.get::<_, Option<String>>(0)?,
            None => None,
        };
        Ok(value)
    }

    fn query_rows(&self, sql: &str) -> Result<Vec<LedgerRow>, Self::Error> {
        let mut stmt = self.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(LedgerRow {
                sequence_id: row.get(0)?,
                version: row.get(1)?,
                applied_on_epoch_ms: row.get(2)?,
                applied_by_user: row.get(3)?,
                applied_by_tool: row.get(4)?,
                applied_by_tool_version: row.get(5)?,
                status: row.get(6)?,
                duration_ms: row.get(7)?,
                failed_script_path: row.get(8)?,
                failed_script_error: row.get(9)?,
                additional_artifacts: row.get(10)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
