//! SQL Server platform
//!
//! Ledger templates in T-SQL, `GO` batch splitting, classification of
//! tiberius server errors, and async connections over TCP.

use crate::capabilities::{Capabilities, ConnectionSummary, Platform};
use crate::classify::{find_source, ErrorClassification};
use crate::error::{PlatformError, PlatformResult};
use crate::template::Template;
use std::error::Error;
use tiberius::error::TokenError;
use tiberius::{AuthMethod, Client, Config as ClientConfig};
use tm_core::{Config, ConnectionConfig, LedgerConfig};
use tm_sql::ScriptSyntax;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// Connected SQL Server client
pub type SqlServerClient = Client<Compat<TcpStream>>;

const DEFAULT_PORT: u16 = 1433;

/// Catalog used for server-level work such as creating databases
const ADMIN_DATABASE: &str = "master";

/// Violation of PRIMARY KEY or UNIQUE constraint
const UNIQUE_CONSTRAINT_VIOLATION: u32 = 2627;
/// Duplicate key row in a unique index
const UNIQUE_INDEX_VIOLATION: u32 = 2601;

const CAPABILITIES: Capabilities = Capabilities {
    transactional_ddl: true,
    schema_support: true,
    batch_support: true,
    upsert_support: true,
    default_schema: "dbo",
    default_table: "__tidemark_version",
};

const DATABASE_EXISTS: Template = Template::new(
    "SELECT COUNT(*) FROM [sys].[databases] WHERE [name] = '${TIDEMARK_DB_NAME}';",
);

const CREATE_DATABASE: Template = Template::new("CREATE DATABASE [${TIDEMARK_DB_NAME}];");

const CREATE_SCHEMA: Template = Template::new("CREATE SCHEMA [${TIDEMARK_SCHEMA_NAME}];");

const LEDGER_CONFIGURED: Template = Template::new(
    "SELECT ISNULL(OBJECT_ID('[${TIDEMARK_SCHEMA_NAME}].[${TIDEMARK_TABLE_NAME}]', 'U'), 0);",
);

const ENSURE_LEDGER_TABLE: Template = Template::new(
    r#"IF OBJECT_ID('[${TIDEMARK_SCHEMA_NAME}].[${TIDEMARK_TABLE_NAME}]', 'U') IS NULL
BEGIN
    CREATE TABLE [${TIDEMARK_SCHEMA_NAME}].[${TIDEMARK_TABLE_NAME}] (
        [SequenceId] INT IDENTITY(1,1) NOT NULL,
        [Version] NVARCHAR(512) NOT NULL,
        [AppliedOnUtc] DATETIME2 NOT NULL CONSTRAINT [DF_${TIDEMARK_TABLE_NAME}_AppliedOnUtc] DEFAULT (SYSUTCDATETIME()),
        [AppliedByUser] NVARCHAR(128) NOT NULL CONSTRAINT [DF_${TIDEMARK_TABLE_NAME}_AppliedByUser] DEFAULT (SUSER_SNAME()),
        [AppliedByTool] NVARCHAR(32) NOT NULL,
        [AppliedByToolVersion] NVARCHAR(16) NOT NULL,
        [Status] NVARCHAR(32) NOT NULL,
        [DurationMs] BIGINT NOT NULL,
        [FailedScriptPath] NVARCHAR(4000) NULL,
        [FailedScriptError] NVARCHAR(4000) NULL,
        [AdditionalArtifacts] NVARCHAR(4000) NULL,
        CONSTRAINT [PK_${TIDEMARK_TABLE_NAME}] PRIMARY KEY CLUSTERED ([SequenceId] ASC),
        CONSTRAINT [UQ_${TIDEMARK_TABLE_NAME}_Version] UNIQUE NONCLUSTERED ([Version] ASC),
        CONSTRAINT [CK_${TIDEMARK_TABLE_NAME}_DurationMs] CHECK ([DurationMs] >= 0)
    );
END"#,
);

const CURRENT_VERSION: Template = Template::new(
    "SELECT TOP 1 [Version] FROM [${TIDEMARK_SCHEMA_NAME}].[${TIDEMARK_TABLE_NAME}] \
     WHERE [Status] = 'Successful' ORDER BY [SequenceId] DESC;",
);

const ALL_VERSIONS: Template = Template::new(
    r#"SELECT
    CAST([SequenceId] AS BIGINT),
    [Version],
    DATEDIFF_BIG(MILLISECOND, '1970-01-01', [AppliedOnUtc]),
    [AppliedByUser],
    [AppliedByTool],
    [AppliedByToolVersion],
    [Status],
    [DurationMs],
    [FailedScriptPath],
    [FailedScriptError],
    [AdditionalArtifacts]
FROM [${TIDEMARK_SCHEMA_NAME}].[${TIDEMARK_TABLE_NAME}]
ORDER BY [Version] ASC;"#,
);

const INSERT_VERSION: Template = Template::new(
    r#"INSERT INTO [${TIDEMARK_SCHEMA_NAME}].[${TIDEMARK_TABLE_NAME}]
    ([Version], [AppliedByUser], [AppliedByTool], [AppliedByToolVersion], [Status], [DurationMs], [FailedScriptPath], [FailedScriptError], [AdditionalArtifacts])
VALUES
    (${TIDEMARK_VERSION}, ${TIDEMARK_APPLIED_BY_USER}, ${TIDEMARK_APPLIED_BY_TOOL}, ${TIDEMARK_APPLIED_BY_TOOL_VERSION}, ${TIDEMARK_STATUS}, ${TIDEMARK_DURATION_MS}, ${TIDEMARK_FAILED_SCRIPT_PATH}, ${TIDEMARK_FAILED_SCRIPT_ERROR}, ${TIDEMARK_ADDITIONAL_ARTIFACTS});"#,
);

const UPSERT_VERSION: Template = Template::new(
    r#"MERGE [${TIDEMARK_SCHEMA_NAME}].[${TIDEMARK_TABLE_NAME}] WITH (HOLDLOCK) AS [target]
USING (SELECT
    ${TIDEMARK_VERSION} AS [Version],
    ${TIDEMARK_APPLIED_BY_USER} AS [AppliedByUser],
    ${TIDEMARK_APPLIED_BY_TOOL} AS [AppliedByTool],
    ${TIDEMARK_APPLIED_BY_TOOL_VERSION} AS [AppliedByToolVersion],
    ${TIDEMARK_STATUS} AS [Status],
    ${TIDEMARK_DURATION_MS} AS [DurationMs],
    ${TIDEMARK_FAILED_SCRIPT_PATH} AS [FailedScriptPath],
    ${TIDEMARK_FAILED_SCRIPT_ERROR} AS [FailedScriptError],
    ${TIDEMARK_ADDITIONAL_ARTIFACTS} AS [AdditionalArtifacts]
) AS [source]
ON [target].[Version] = [source].[Version]
WHEN MATCHED THEN
    UPDATE SET
        [target].[AppliedOnUtc] = SYSUTCDATETIME(),
        [target].[AppliedByUser] = [source].[AppliedByUser],
        [target].[AppliedByTool] = [source].[AppliedByTool],
        [target].[AppliedByToolVersion] = [source].[AppliedByToolVersion],
        [target].[Status] = [source].[Status],
        [target].[DurationMs] = [source].[DurationMs],
        [target].[FailedScriptPath] = [source].[FailedScriptPath],
        [target].[FailedScriptError] = [source].[FailedScriptError],
        [target].[AdditionalArtifacts] = [source].[AdditionalArtifacts]
WHEN NOT MATCHED THEN
    INSERT ([Version], [AppliedByUser], [AppliedByTool], [AppliedByToolVersion], [Status], [DurationMs], [FailedScriptPath], [FailedScriptError], [AdditionalArtifacts])
    VALUES ([source].[Version], [source].[AppliedByUser], [source].[AppliedByTool], [source].[AppliedByToolVersion], [source].[Status], [source].[DurationMs], [source].[FailedScriptPath], [source].[FailedScriptError], [source].[AdditionalArtifacts]);"#,
);

/// Microsoft SQL Server
#[derive(Debug, Clone)]
pub struct SqlServerPlatform {
    connection: ConnectionConfig,
    schema: String,
    table: String,
}

impl SqlServerPlatform {
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

    /// Client settings for the configured database.
    pub fn client_config(&self) -> ClientConfig {
        build_client_config(&self.connection)
    }

    /// Client settings for the server's administrative catalog.
    pub fn admin_client_config(&self) -> ClientConfig {
        build_client_config(&self.connection.with_database(ADMIN_DATABASE))
    }

    pub async fn open_connection(&self) -> PlatformResult<SqlServerClient> {
        connect(self.client_config()).await
    }

    /// Connection to `master`, for creating the configured database.
    pub async fn open_admin_connection(&self) -> PlatformResult<SqlServerClient> {
        connect(self.admin_client_config()).await
    }
}

fn build_client_config(connection: &ConnectionConfig) -> ClientConfig {
    let mut config = ClientConfig::new();
    config.host(&connection.host);
    config.port(connection.port.unwrap_or(DEFAULT_PORT));
    config.database(&connection.database);
    config.application_name(tm_core::record::TOOL_NAME);
    if let (Some(username), Some(password)) = (&connection.username, &connection.password) {
        config.authentication(AuthMethod::sql_server(username, password));
    }
    if connection.trust_cert {
        config.trust_cert();
    }
    config
}

async fn connect(config: ClientConfig) -> PlatformResult<SqlServerClient> {
    let target = config.get_addr();
    let connection_error = |message: String| PlatformError::Connection {
        target: target.clone(),
        message,
    };

    let tcp = TcpStream::connect(config.get_addr())
        .await
        .map_err(|e| connection_error(e.to_string()))?;
    tcp.set_nodelay(true).ok();

    let client = Client::connect(config, tcp.compat_write())
        .await
        .map_err(|e| connection_error(e.to_string()))?;
    log::debug!("Connected to SQL Server at {}", target);
    Ok(client)
}

/// An error raised by the server, as carried in a TDS error token.
///
/// Displays the way SQL Server tools print it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Msg {code}, Level {class}, State {state}, Line {line}: {message}")]
pub struct ServerError {
    pub code: u32,
    pub class: u8,
    pub state: u8,
    pub line: u32,
    pub message: String,
}

impl From<&TokenError> for ServerError {
    fn from(token: &TokenError) -> Self {
        Self {
            code: token.code(),
            class: token.class(),
            state: token.state(),
            line: token.line(),
            message: token.message().to_string(),
        }
    }
}

/// Failure of a statement sent through a tiberius client
#[derive(Debug, thiserror::Error)]
pub enum SqlServerError {
    #[error("{0}")]
    Server(#[source] ServerError),

    #[error("SQL Server client error: {0}")]
    Client(#[source] tiberius::error::Error),
}

impl From<tiberius::error::Error> for SqlServerError {
    fn from(err: tiberius::error::Error) -> Self {
        match err {
            tiberius::error::Error::Server(token) => Self::Server(ServerError::from(&token)),
            other => Self::Client(other),
        }
    }
}

fn is_unique_violation_code(code: u32) -> bool {
    code == UNIQUE_CONSTRAINT_VIOLATION || code == UNIQUE_INDEX_VIOLATION
}

impl Platform for SqlServerPlatform {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn capabilities(&self) -> &Capabilities {
        &CAPABILITIES
    }

    fn script_syntax(&self) -> ScriptSyntax {
        ScriptSyntax::SQL_SERVER
    }

    fn connection_summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            host: self.connection.host.clone(),
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

    fn upsert_template(&self) -> Option<Template> {
        Some(UPSERT_VERSION)
    }

    fn classify_error(&self, error: &(dyn Error + 'static)) -> ErrorClassification {
        if let Some(server) = find_source::<ServerError>(error) {
            return ErrorClassification::recognized(server.to_string());
        }
        match find_source::<tiberius::error::Error>(error) {
            Some(tiberius::error::Error::Server(token)) => {
                ErrorClassification::recognized(ServerError::from(token).to_string())
            }
            Some(other) => ErrorClassification::recognized(format!("SQL Server client error: {other}")),
            None => ErrorClassification::unrecognized(),
        }
    }

    fn is_unique_violation(&self, error: &(dyn Error + 'static)) -> bool {
        if let Some(server) = find_source::<ServerError>(error) {
            return is_unique_violation_code(server.code);
        }
        find_source::<tiberius::error::Error>(error)
            .and_then(|e| e.code())
            .is_some_and(is_unique_violation_code)
    }
}

#[cfg(test)]
#[path = "sqlserver_test.rs"]
mod tests;
