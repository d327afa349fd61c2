//! Ledger provisioning.

use crate::bind;
use crate::connection::LedgerConnection;
use crate::error::{LedgerError, LedgerResult};
use tm_platform::{Platform, Template};

/// Provisions the database, schema, and ledger table for one run.
///
/// `ensure_ledger_table` is idempotent but not safe against two migrators
/// racing on the same uninitialized database; whether table creation is
/// atomic is up to the engine.
pub struct LedgerSchema<'a, C: LedgerConnection> {
    platform: &'a dyn Platform,
    conn: &'a C,
}

impl<'a, C: LedgerConnection> LedgerSchema<'a, C> {
    pub fn new(platform: &'a dyn Platform, conn: &'a C) -> Self {
        Self { platform, conn }
    }

    /// Whether the configured database exists. Run on an admin connection.
    pub fn database_exists(&self) -> LedgerResult<bool> {
        self.check(self.platform.database_exists_query())
    }

    /// Create the configured database. Run on an admin connection.
    pub fn create_database(&self) -> LedgerResult<()> {
        self.run(self.platform.create_database_statement())?;
        log::debug!("Created database {}", self.platform.database_name());
        Ok(())
    }

    pub fn create_schema(&self) -> LedgerResult<()> {
        self.run(self.platform.create_schema_statement())?;
        log::debug!("Created schema {}", self.platform.ledger_schema());
        Ok(())
    }

    /// Whether the ledger table exists.
    pub fn is_configured(&self) -> LedgerResult<bool> {
        self.check(self.platform.ledger_configured_query())
    }

    /// Create the ledger table unless it exists. Returns whether it was created.
    pub fn ensure_ledger_table(&self) -> LedgerResult<bool> {
        if self.is_configured()? {
            log::debug!(
                "Ledger table {}.{} already exists",
                self.platform.ledger_schema(),
                self.platform.ledger_table()
            );
            return Ok(false);
        }

        self.run(self.platform.ensure_ledger_table_statement())?;
        log::debug!(
            "Created ledger table {}.{}",
            self.platform.ledger_schema(),
            self.platform.ledger_table()
        );
        Ok(true)
    }

    /// Run the platform's ledger upgrade, if it has one. Returns whether a
    /// statement ran. Call after `ensure_ledger_table`.
    pub fn upgrade_ledger_table(&self) -> LedgerResult<bool> {
        let Some(statement) = self.platform.upgrade_ledger_table_statement() else {
            return Ok(false);
        };
        self.run(statement)?;
        log::info!(
            "Upgraded ledger table {}.{}",
            self.platform.ledger_schema(),
            self.platform.ledger_table()
        );
        Ok(true)
    }

    fn check(&self, query: Template) -> LedgerResult<bool> {
        let sql = bind::location(self.platform).render(query)?;
        let found = self
            .conn
            .query_i64(&sql)
            .map_err(|e| LedgerError::driver(self.platform, e))?;
        Ok(found.is_some_and(|n| n != 0))
    }

    fn run(&self, statement: Template) -> LedgerResult<()> {
        let sql = bind::location(self.platform).render(statement)?;
        self.conn
            .execute_batch(&sql)
            .map_err(|e| LedgerError::driver(self.platform, e))
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
