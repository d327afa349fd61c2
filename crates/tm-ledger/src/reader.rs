//! Reading ledger history.

use crate::bind;
use crate::connection::{LedgerConnection, LedgerRow};
use crate::error::{LedgerError, LedgerResult};
use chrono::DateTime;
use tm_core::{MigrationRecord, MigrationStatus, Version};
use tm_platform::Platform;

pub struct LedgerReader<'a, C: LedgerConnection> {
    platform: &'a dyn Platform,
    conn: &'a C,
}

impl<'a, C: LedgerConnection> LedgerReader<'a, C> {
    pub fn new(platform: &'a dyn Platform, conn: &'a C) -> Self {
        Self { platform, conn }
    }

    /// Version of the most recently inserted successful row, if any.
    pub fn current_version(&self) -> LedgerResult<Option<Version>> {
        let sql = bind::location(self.platform).render(self.platform.current_version_query())?;
        let version = self
            .conn
            .query_string(&sql)
            .map_err(|e| LedgerError::driver(self.platform, e))?;

        version
            .map(|v| {
                Version::new(v).map_err(|e| LedgerError::InvalidRecord {
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Every row, ordered by version as plain text.
    ///
    /// The order is lexicographic, so `10.00` sorts before `2.00`.
    pub fn all_versions(&self) -> LedgerResult<Vec<MigrationRecord>> {
        let sql = bind::location(self.platform).render(self.platform.all_versions_query())?;
        let rows = self
            .conn
            .query_rows(&sql)
            .map_err(|e| LedgerError::driver(self.platform, e))?;
        rows.into_iter().map(decode_row).collect()
    }
}

fn decode_row(row: LedgerRow) -> LedgerResult<MigrationRecord> {
    let sequence_id = row.sequence_id;
    let invalid = |message: String| LedgerError::InvalidRecord {
        message: format!("sequence id {sequence_id}: {message}"),
    };

    let version = Version::new(row.version).map_err(|e| invalid(e.to_string()))?;
    let applied_on_utc = DateTime::from_timestamp_millis(row.applied_on_epoch_ms)
        .ok_or_else(|| invalid(format!("timestamp {} out of range", row.applied_on_epoch_ms)))?;
    let status = row
        .status
        .parse::<MigrationStatus>()
        .map_err(|e| invalid(e.to_string()))?;
    let duration_ms = u64::try_from(row.duration_ms)
        .map_err(|_| invalid(format!("negative duration {}", row.duration_ms)))?;
    let additional_artifacts =
        MigrationRecord::parse_artifacts(row.additional_artifacts.as_deref())
            .map_err(|e| invalid(e.to_string()))?;

    Ok(MigrationRecord {
        sequence_id,
        version,
        applied_on_utc,
        applied_by_user: row.applied_by_user,
        applied_by_tool: row.applied_by_tool,
        applied_by_tool_version: row.applied_by_tool_version,
        status,
        duration_ms,
        failed_script_path: row.failed_script_path,
        failed_script_error: row.failed_script_error,
        additional_artifacts,
    })
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;
