//! DuckDB platform
//!
//! An embedded engine: scripts run whole (no batch separator), the ledger's
//! sequence id comes from a sequence, and "connecting" opens a database file
//! or an in-memory database.

use crate::capabilities::{Capabilities, ConnectionSummary, Platform};
use crate::classify::{find_source, ErrorClassification};
use crate::error::{PlatformError, PlatformResult};
use crate::template::Template;
use duckdb::Connection;
use std::error::Error;
use tm_core::{Config, ConnectionConfig, LedgerConfig};
use tm_sql::ScriptSyntax;

const CAPABILITIES: Capabilities = Capabilities {
    transactional_ddl: true,
    schema_support: true,
    batch_support: false,
    upsert_support: true,
    default_schema: "main",
    default_table: "__tidemark_version",
};

const DATABASE_EXISTS: Template = Template::new(
    "SELECT COUNT(*) FROM duckdb_databases() WHERE database_name = '${TIDEMARK_DB_NAME}';",
);

const CREATE_DATABASE: Template = Template::new(
    "ATTACH IF NOT EXISTS '${TIDEMARK_DB_NAME}.duckdb' AS \"${TIDEMARK_DB_NAME}\";",
);

const CREATE_SCHEMA: Template =
    Template::new("CREATE SCHEMA IF NOT EXISTS \"${TIDEMARK_SCHEMA_NAME}\";");

const LEDGER_CONFIGURED: Template = Template::new(
    "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_catalog = current_database() \
     AND table_schema = '${TIDEMARK_SCHEMA_NAME}' AND table_name = '${TIDEMARK_TABLE_NAME}';",
);

const ENSURE_LEDGER_TABLE: Template = Template::new(
    r#"CREATE SEQUENCE IF NOT EXISTS "${TIDEMARK_SCHEMA_NAME}"."${TIDEMARK_TABLE_NAME}_sequence_id" START 1;
CREATE TABLE IF NOT EXISTS "${TIDEMARK_SCHEMA_NAME}"."${TIDEMARK_TABLE_NAME}" (
    sequence_id BIGINT PRIMARY KEY DEFAULT nextval('${TIDEMARK_SCHEMA_NAME}.${TIDEMARK_TABLE_NAME}_sequence_id'),
    version VARCHAR NOT NULL UNIQUE,
    applied_on_utc TIMESTAMP NOT NULL DEFAULT current_timestamp,
    applied_by_user VARCHAR NOT NULL,
    applied_by_tool VARCHAR NOT NULL,
    applied_by_tool_version VARCHAR NOT NULL,
    status VARCHAR NOT NULL,
    duration_ms BIGINT NOT NULL CHECK (duration_ms >= 0),
    failed_script_path VARCHAR,
    failed_script_error VARCHAR,
    additional_artifacts VARCHAR
);"#,
);

const CURRENT_VERSION: Template = Template::new(
    "SELECT version FROM \"${TIDEMARK_SCHEMA_NAME}\".\"${TIDEMARK_TABLE_NAME}\" \
     WHERE status = 'Successful' ORDER BY sequence_id DESC LIMIT 1;",
);

const ALL_VERSIONS: Template = Template::new(
    r#"SELECT
    sequence_id,
    version,
    epoch_ms(applied_on_utc),
    applied_by_user,
    applied_by_tool,
    applied_by_tool_version,
    status,
    duration_ms,
    failed_script_path,
    failed_script_error,
    additional_artifacts
FROM "${TIDEMARK_SCHEMA_NAME}"."${TIDEMARK_TABLE_NAME}"
ORDER BY version ASC;"#,
);

const INSERT_VERSION: Template = Template::new(
    r#"INSERT INTO "${TIDEMARK_SCHEMA_NAME}"."${TIDEMARK_TABLE_NAME}"
    (version, applied_by_user, applied_by_tool, applied_by_tool_version, status, duration_ms, failed_script_path, failed_script_error, additional_artifacts)
VALUES
    (${TIDEMARK_VERSION}, ${TIDEMARK_APPLIED_BY_USER}, ${TIDEMARK_APPLIED_BY_TOOL}, ${TIDEMARK_APPLIED_BY_TOOL_VERSION}, ${TIDEMARK_STATUS}, ${TIDEMARK_DURATION_MS}, ${TIDEMARK_FAILED_SCRIPT_PATH}, ${TIDEMARK_FAILED_SCRIPT_ERROR}, ${TIDEMARK_ADDITIONAL_ARTIFACTS});"#,
);

const UPDATE_VERSION: Template = Template::new(
    r#"UPDATE "${TIDEMARK_SCHEMA_NAME}"."${TIDEMARK_TABLE_NAME}"
SET
    applied_on_utc = current_timestamp,
    applied_by_user = ${TIDEMARK_APPLIED_BY_USER},
    applied_by_tool = ${TIDEMARK_APPLIED_BY_TOOL},
    applied_by_tool_version = ${TIDEMARK_APPLIED_BY_TOOL_VERSION},
    status = ${TIDEMARK_STATUS},
    duration_ms = ${TIDEMARK_DURATION_MS},
    failed_script_path = ${TIDEMARK_FAILED_SCRIPT_PATH},
    failed_script_error = ${TIDEMARK_FAILED_SCRIPT_ERROR},
    additional_artifacts = ${TIDEMARK_ADDITIONAL_ARTIFACTS}
WHERE version = ${TIDEMARK_VERSION};"#,
);

const UPSERT_VERSION: Template = Template::new(
    r#"INSERT INTO "${TIDEMARK_SCHEMA_NAME}"."${TIDEMARK_TABLE_NAME}"
    (version, applied_by_user, applied_by_tool, applied_by_tool_version, status, duration_ms, failed_script_path, failed_script_error, additional_artifacts)
VALUES
    (${TIDEMARK_VERSION}, ${TIDEMARK_APPLIED_BY_USER}, ${TIDEMARK_APPLIED_BY_TOOL}, ${TIDEMARK_APPLIED_BY_TOOL_VERSION}, ${TIDEMARK_STATUS}, ${TIDEMARK_DURATION_MS}, ${TIDEMARK_FAILED_SCRIPT_PATH}, ${TIDEMARK_FAILED_SCRIPT_ERROR}, ${TIDEMARK_ADDITIONAL_ARTIFACTS})
ON CONFLICT (version) DO UPDATE SET
    applied_on_utc = current_timestamp,
    applied_by_user = EXCLUDED.applied_by_user,
    applied_by_tool = EXCLUDED.applied_by_tool,
    applied_by_tool_version = EXCLUDED.applied_by_tool_version,
    status = EXCLUDED.status,
    duration_ms = EXCLUDED.duration_ms,
    failed_script_path = EXCLUDED.failed_script_path,
    failed_script_error = EXCLUDED.failed_script_error,
    additional_artifacts = EXCLUDED.additional_artifacts;"#,
);

/// Embedded DuckDB
#[derive(Debug, Clone)]
pub struct DuckDbPlatform {
    connection: ConnectionConfig,
    schema: String,
    table: String,
}

impl DuckDbPlatform {
    pub fn new(connection: ConnectionConfig, ledger: &LedgerConfig) -> Self {
        Self {
            connection,
            schema: ledger
                .schema
                .clone()
                .unwrap_or_else(|| CAPABILITIES.default_schema.to_string()),
            table: ledger
                .table
                .clone()
                .unwrap_or_else(|| CAPABILITIES.default_table.to_string()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.connection.clone(), &config.ledger)
    }

    /// Open the configured database file, or an in-memory database.
    pub fn open_connection(&self) -> PlatformResult<Connection> {
        let result = if self.connection.is_in_memory() {
            Connection::open_in_memory()
        } else {
            Connection::open(&self.connection.path)
        };
        let conn = result.map_err(|e| PlatformError::Connection {
            target: self.connection.path.clone(),
            message: e.to_string(),
        })?;
        log::debug!("Opened DuckDB database {}", self.connection.path);
        Ok(conn)
    }

    /// In-memory session from which other databases can be attached.
    pub fn open_admin_connection(&self) -> PlatformResult<Connection> {
        Connection::open_in_memory().map_err(|e| PlatformError::Connection {
            target: ":memory:".to_string(),
            message: e.to_string(),
        })
    }
}

fn is_unique_violation_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("duplicate key")
        || lower.contains("violates unique constraint")
        || lower.contains("violates primary key constraint")
}

impl Platform for DuckDbPlatform {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn capabilities(&self) -> &Capabilities {
        &CAPABILITIES
    }

    fn script_syntax(&self) -> ScriptSyntax {
        ScriptSyntax::DUCKDB
    }

    fn connection_summary(&self) -> ConnectionSummary {
        // The database file stands in for the host of an embedded engine.
        ConnectionSummary {
            host: self.connection.path.clone(),
            database: self.connection.database.clone(),
        }
    }

    fn database_name(&self) -> &str {
        &self.connection.database
    }

    fn ledger_schema(&self) -> &str {
        &self.schema
    }

    fn ledger_table(&self) -> &str {
        &self.table
    }

    fn database_exists_query(&self) -> Template {
        DATABASE_EXISTS
    }

    fn create_database_statement(&self) -> Template {
        CREATE_DATABASE
    }

    fn create_schema_statement(&self) -> Template {
        CREATE_SCHEMA
    }

    fn ledger_configured_query(&self) -> Template {
        LEDGER_CONFIGURED
    }

    fn ensure_ledger_table_statement(&self) -> Template {
        ENSURE_LEDGER_TABLE
    }

    fn current_version_query(&self) -> Template {
        CURRENT_VERSION
    }

    fn all_versions_query(&self) -> Template {
        ALL_VERSIONS
    }

    fn insert_version_statement(&self) -> Template {
        INSERT_VERSION
    }

    fn update_template(&self) -> Option<Template> {
        Some(UPDATE_VERSION)
    }

    fn upsert_template(&self) -> Option<Template> {
        Some(UPSERT_VERSION)
    }

    fn classify_error(&self, error: &(dyn Error + 'static)) -> ErrorClassification {
        match find_source::<duckdb::Error>(error) {
            Some(duckdb::Error::DuckDBFailure(native, message)) => {
                let message = message.as_deref().unwrap_or("unspecified DuckDB failure");
                ErrorClassification::recognized(format!("Error {:?}: {message}", native.code))
            }
            Some(other) => ErrorClassification::recognized(format!("Error: {other}")),
            None => ErrorClassification::unrecognized(),
        }
    }

    fn is_unique_violation(&self, error: &(dyn Error + 'static)) -> bool {
        find_source::<duckdb::Error>(error)
            .is_some_and(|e| is_unique_violation_message(&e.to_string()))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
