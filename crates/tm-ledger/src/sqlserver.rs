//! Ledger connection over a tiberius client.
//!
//! tiberius is async while [`LedgerConnection`] is not, so the connection
//! owns a current-thread tokio runtime and blocks on each statement. It must
//! not be used from inside another tokio runtime.

use crate::connection::{LedgerConnection, LedgerRow};
use crate::error::LedgerResult;
use std::cell::RefCell;
use tiberius::ColumnData;
use tm_platform::{PlatformError, SqlServerClient, SqlServerError, SqlServerPlatform};
use tokio::runtime::{Builder, Runtime};

/// A SQL Server connection usable by the ledger.
pub struct SqlServerConnection {
    runtime: Runtime,
    client: RefCell<SqlServerClient>,
}

impl SqlServerConnection {
    /// Connect to the configured database.
    pub fn open(platform: &SqlServerPlatform) -> LedgerResult<Self> {
        let runtime = build_runtime(platform)?;
        let client = runtime.block_on(platform.open_connection())?;
        Ok(Self::new(runtime, client))
    }

    /// Connect to `master`, for checking and creating the configured database.
    pub fn open_admin(platform: &SqlServerPlatform) -> LedgerResult<Self> {
        let runtime = build_runtime(platform)?;
        let client = runtime.block_on(platform.open_admin_connection())?;
        Ok(Self::new(runtime, client))
    }

    /// Wrap a client that was connected on `runtime`.
    pub fn new(runtime: Runtime, client: SqlServerClient) -> Self {
        Self {
            runtime,
            client: RefCell::new(client),
        }
    }
}

fn build_runtime(platform: &SqlServerPlatform) -> LedgerResult<Runtime> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PlatformError::Connection {
            target: platform.client_config().get_addr(),
            message: format!("failed to start runtime: {e}"),
        })?;
    Ok(runtime)
}

impl LedgerConnection for SqlServerConnection {
    type Error = SqlServerError;

    fn execute_batch(&self, sql: &str) -> Result<(), Self::Error> {
        self.runtime
            .block_on(run_batch(&mut self.client.borrow_mut(), sql))
    }

    fn execute(&self, sql: &str) -> Result<usize, Self::Error> {
        let total = self
            .runtime
            .block_on(run_statement(&mut self.client.borrow_mut(), sql))?;
        Ok(usize::try_from(total).unwrap_or(usize::MAX))
    }

    fn query_i64(&self, sql: &str) -> Result<Option<i64>, Self::Error> {
        match self
            .runtime
            .block_on(first_cell(&mut self.client.borrow_mut(), sql))?
        {
            Some(data) => integer_value(data),
            None => Ok(None),
        }
    }

    fn query_string(&self, sql: &str) -> Result<Option<String>, Self::Error> {
        match self
            .runtime
            .block_on(first_cell(&mut self.client.borrow_mut(), sql))?
        {
            Some(data) => text_value(data),
            None => Ok(None),
        }
    }

    fn query_rows(&self, sql: &str) -> Result<Vec<LedgerRow>, Self::Error> {
        let rows = self
            .runtime
            .block_on(all_rows(&mut self.client.borrow_mut(), sql))?;
        rows.into_iter().map(ledger_row).collect()
    }
}

async fn run_batch(client: &mut SqlServerClient, sql: &str) -> Result<(), SqlServerError> {
    client.simple_query(sql).await?.into_results().await?;
    Ok(())
}

async fn run_statement(client: &mut SqlServerClient, sql: &str) -> Result<u64, SqlServerError> {
    let result = client.execute(sql, &[]).await?;
    Ok(result.total())
}

async fn first_cell(
    client: &mut SqlServerClient,
    sql: &str,
) -> Result<Option<ColumnData<'static>>, SqlServerError> {
    let row = client.simple_query(sql).await?.into_row().await?;
    Ok(row.and_then(|row| row.into_iter().next()))
}

async fn all_rows(
    client: &mut SqlServerClient,
    sql: &str,
) -> Result<Vec<Vec<ColumnData<'static>>>, SqlServerError> {
    let rows = client.simple_query(sql).await?.into_first_result().await?;
    Ok(rows.into_iter().map(|row| row.into_iter().collect()).collect())
}

fn conversion(message: String) -> SqlServerError {
    SqlServerError::Client(tiberius::error::Error::Conversion(message.into()))
}

/// Integer columns of any width; `COUNT(*)` and `OBJECT_ID` come back as `INT`.
fn integer_value(data: ColumnData<'static>) -> Result<Option<i64>, SqlServerError> {
    match data {
        ColumnData::U8(v) => Ok(v.map(i64::from)),
        ColumnData::I16(v) => Ok(v.map(i64::from)),
        ColumnData::I32(v) => Ok(v.map(i64::from)),
        ColumnData::I64(v) => Ok(v),
        other => Err(conversion(format!("expected an integer, found {other:?}"))),
    }
}

fn text_value(data: ColumnData<'static>) -> Result<Option<String>, SqlServerError> {
    match data {
        ColumnData::String(v) => Ok(v.map(|s| s.into_owned())),
        other => Err(conversion(format!("expected text, found {other:?}"))),
    }
}

/// Cells of one records-query row, consumed in column order.
struct Cells {
    cells: std::vec::IntoIter<ColumnData<'static>>,
}

impl Cells {
    fn next(&mut self, column: &str) -> Result<ColumnData<'static>, SqlServerError> {
        self.cells
            .next()
            .ok_or_else(|| conversion(format!("ledger row has no {column} column")))
    }

    fn integer(&mut self, column: &str) -> Result<i64, SqlServerError> {
        integer_value(self.next(column)?)?
            .ok_or_else(|| conversion(format!("ledger column {column} is NULL")))
    }

    fn text(&mut self, column: &str) -> Result<String, SqlServerError> {
        self.optional_text(column)?
            .ok_or_else(|| conversion(format!("ledger column {column} is NULL")))
    }

    fn optional_text(&mut self, column: &str) -> Result<Option<String>, SqlServerError> {
        text_value(self.next(column)?)
    }
}

fn ledger_row(cells: Vec<ColumnData<'static>>) -> Result<LedgerRow, SqlServerError> {
    let mut cells = Cells {
        cells: cells.into_iter(),
    };
    Ok(LedgerRow {
        sequence_id: cells.integer("SequenceId")?,
        version: cells.text("Version")?,
        applied_on_epoch_ms: cells.integer("AppliedOnUtc")?,
        applied_by_user: cells.text("AppliedByUser")?,
        applied_by_tool: cells.text("AppliedByTool")?,
        applied_by_tool_version: cells.text("AppliedByToolVersion")?,
        status: cells.text("Status")?,
        duration_ms: cells.integer("DurationMs")?,
        failed_script_path: cells.optional_text("FailedScriptPath")?,
        failed_script_error: cells.optional_text("FailedScriptError")?,
        additional_artifacts: cells.optional_text("AdditionalArtifacts")?,
    })
}

#[cfg(test)]
#[path = "sqlserver_test.rs"]
mod tests;
