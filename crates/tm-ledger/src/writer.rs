//! Recording migration outcomes.

use crate::bind;
use crate::connection::LedgerConnection;
use crate::error::{LedgerError, LedgerResult};
use tm_core::MigrationEntry;
use tm_platform::{Platform, Template};

/// Writes ledger rows through the platform's templates.
///
/// Statements run on the caller's connection, inside whatever transaction
/// the caller has open.
pub struct LedgerWriter<'a, C: LedgerConnection> {
    platform: &'a dyn Platform,
    conn: &'a C,
}

impl<'a, C: LedgerConnection> LedgerWriter<'a, C> {
    pub fn new(platform: &'a dyn Platform, conn: &'a C) -> Self {
        Self { platform, conn }
    }

    /// Append a row. Fails with `DuplicateVersion` if the version is recorded.
    pub fn insert(&self, entry: &MigrationEntry) -> LedgerResult<()> {
        let affected = self.write(self.platform.insert_version_statement(), entry)?;
        log::debug!(
            "Recorded version {} as {} ({} row)",
            entry.version,
            entry.status,
            affected
        );
        Ok(())
    }

    /// Insert a row, or overwrite the row with the same version in place.
    ///
    /// The sequence id of an existing row is kept.
    pub fn upsert(&self, entry: &MigrationEntry) -> LedgerResult<()> {
        let statement = self.platform.upsert_version_statement()?;
        self.write(statement, entry)?;
        log::debug!("Upserted version {} as {}", entry.version, entry.status);
        Ok(())
    }

    /// Overwrite the row with the same version. Fails if there is none.
    pub fn update(&self, entry: &MigrationEntry) -> LedgerResult<()> {
        let statement = self.platform.update_version_statement()?;
        if self.write(statement, entry)? == 0 {
            return Err(LedgerError::VersionNotFound {
                version: entry.version.to_string(),
            });
        }
        log::debug!("Updated version {} to {}", entry.version, entry.status);
        Ok(())
    }

    fn write(&self, statement: Template, entry: &MigrationEntry) -> LedgerResult<usize> {
        let sql = bind::entry(self.platform, entry)?.render(statement)?;
        self.conn.execute(&sql).map_err(|e| {
            if self.platform.is_unique_violation(&e) {
                LedgerError::DuplicateVersion {
                    version: entry.version.to_string(),
                }
            } else {
                LedgerError::driver(self.platform, e)
            }
        })
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod tests;
