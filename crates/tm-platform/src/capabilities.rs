//! Platform trait and capability flags

use crate::classify::ErrorClassification;
use crate::error::{PlatformError, PlatformResult};
use crate::template::Template;
use std::error::Error;
use tm_sql::{BatchSegmenter, ScriptSyntax, SqlResult};

/// Feature flags and ledger defaults for one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// DDL can be rolled back inside a transaction
    pub transactional_ddl: bool,
    /// Objects live in named schemas
    pub schema_support: bool,
    /// Scripts are split into batches at separator lines
    pub batch_support: bool,
    /// The ledger supports insert-or-replace by version
    pub upsert_support: bool,
    /// Schema used when the configuration names none
    pub default_schema: &'static str,
    /// Ledger table used when the configuration names none
    pub default_table: &'static str,
}

/// Host and database a platform connects to, for log and error messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub host: String,
    pub database: String,
}

impl std::fmt::Display for ConnectionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.host, self.database)
    }
}

/// Everything the migration engine needs to know about one database engine.
///
/// Implementations are immutable after construction and safe to share
/// across threads. Templates are returned as data; binding them is done by
/// [`crate::Bindings`], never by the platform.
pub trait Platform: Send + Sync {
    /// Short lowercase name, e.g. `sqlserver`
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> &Capabilities;

    /// Comment, quoting, and separator rules for this platform's scripts
    fn script_syntax(&self) -> ScriptSyntax;

    fn connection_summary(&self) -> ConnectionSummary;

    /// Catalog holding the ledger
    fn database_name(&self) -> &str;

    /// Schema holding the ledger, configured or defaulted
    fn ledger_schema(&self) -> &str;

    /// Ledger table name, configured or defaulted
    fn ledger_table(&self) -> &str;

    /// Returns a count; non-zero when the database exists
    fn database_exists_query(&self) -> Template;

    fn create_database_statement(&self) -> Template;

    fn create_schema_statement(&self) -> Template;

    /// Returns a count or object id; non-zero when the ledger table exists
    fn ledger_configured_query(&self) -> Template;

    /// Creates the ledger table if it is absent
    fn ensure_ledger_table_statement(&self) -> Template;

    /// Brings an existing ledger table up to the current layout, for
    /// platforms whose layout changed after tables were created with it
    fn upgrade_ledger_table_statement(&self) -> Option<Template> {
        None
    }

    /// Returns the version of the latest successful row, or no row
    fn current_version_query(&self) -> Template;

    /// Returns every ledger row ordered by version text
    fn all_versions_query(&self) -> Template;

    fn insert_version_statement(&self) -> Template;

    /// In-place update by version, when the platform offers one
    fn update_template(&self) -> Option<Template> {
        None
    }

    /// Insert-or-replace by version, when the platform offers one
    fn upsert_template(&self) -> Option<Template> {
        None
    }

    fn update_version_statement(&self) -> PlatformResult<Template> {
        self.update_template()
            .ok_or_else(|| PlatformError::unsupported(self.name(), "Updating a ledger version"))
    }

    fn upsert_version_statement(&self) -> PlatformResult<Template> {
        if !self.capabilities().upsert_support {
            return Err(PlatformError::unsupported(
                self.name(),
                "Upserting a ledger version",
            ));
        }
        self.upsert_template()
            .ok_or_else(|| PlatformError::unsupported(self.name(), "Upserting a ledger version"))
    }

    /// Split a raw script into executable batches.
    fn segment(&self, raw_script: &str) -> SqlResult<Vec<String>> {
        BatchSegmenter::new(self.script_syntax()).segment(raw_script)
    }

    /// Explain a native driver error in the platform's own terms.
    fn classify_error(&self, error: &(dyn Error + 'static)) -> ErrorClassification;

    /// Whether `error` reports a duplicate key on the ledger's unique version
    fn is_unique_violation(&self, _error: &(dyn Error + 'static)) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "capabilities_test.rs"]
mod tests;
