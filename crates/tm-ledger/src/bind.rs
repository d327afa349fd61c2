//! Bindings for ledger templates.

use crate::error::LedgerResult;
use tm_core::MigrationEntry;
use tm_platform::{Bindings, Placeholder, Platform};

/// Database, schema, and table names of the platform's ledger.
pub(crate) fn location(platform: &dyn Platform) -> Bindings {
    Bindings::new()
        .identifier(Placeholder::DatabaseName, platform.database_name())
        .identifier(Placeholder::SchemaName, platform.ledger_schema())
        .identifier(Placeholder::TableName, platform.ledger_table())
}

/// Location plus every value column of `entry`.
pub(crate) fn entry(platform: &dyn Platform, entry: &MigrationEntry) -> LedgerResult<Bindings> {
    Ok(location(platform)
        .text(Placeholder::Version, entry.version.as_str())
        .text(Placeholder::AppliedByUser, entry.applied_by_user.as_str())
        .text(Placeholder::AppliedByTool, entry.applied_by_tool.as_str())
        .text(
            Placeholder::AppliedByToolVersion,
            entry.applied_by_tool_version.as_str(),
        )
        .text(Placeholder::Status, entry.status.as_str())
        .integer(Placeholder::DurationMs, entry.duration_ms)
        .optional_text(
            Placeholder::FailedScriptPath,
            entry.failed_script_path.clone(),
        )
        .optional_text(
            Placeholder::FailedScriptError,
            entry.failed_script_error.clone(),
        )
        .optional_text(Placeholder::AdditionalArtifacts, entry.artifacts_json()?))
}
