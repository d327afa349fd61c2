//! Ledger record types
//!
//! [`MigrationEntry`] is what a caller hands to the ledger when recording the
//! outcome of a migration step. [`MigrationRecord`] is what comes back when
//! reading the ledger: the same fields plus the values the store assigns
//! itself (sequence id and application timestamp).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::version::Version;

/// Tool name recorded when the caller does not supply one.
pub const TOOL_NAME: &str = "tidemark";

/// Outcome of applying one migration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationStatus {
    /// The version was applied completely
    Successful,
    /// Applying the version failed partway through
    Failed,
}

impl MigrationStatus {
    /// The string stored in the ledger's status column.
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Successful => "Successful",
            MigrationStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Successful" => Ok(MigrationStatus::Successful),
            "Failed" => Ok(MigrationStatus::Failed),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// A ledger row to be written.
///
/// Carries no sequence id and no timestamp: both are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationEntry {
    /// Version being recorded
    pub version: Version,

    /// OS or database user who ran the migration
    pub applied_by_user: String,

    /// Name of the tool that applied the version
    pub applied_by_tool: String,

    /// Version of the tool that applied the version
    pub applied_by_tool_version: String,

    /// Outcome
    pub status: MigrationStatus,

    /// Wall-clock time spent applying the version
    pub duration_ms: u64,

    /// Script that failed, when `status` is `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_script_path: Option<String>,

    /// Error raised by the failing script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_script_error: Option<String>,

    /// Extra files produced or consumed while applying the version
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_artifacts: Vec<String>,
}

impl MigrationEntry {
    /// Entry for a version that was applied completely.
    pub fn successful(version: Version, duration_ms: u64) -> Self {
        Self {
            version,
            applied_by_user: whoami(),
            applied_by_tool: TOOL_NAME.to_string(),
            applied_by_tool_version: env!("CARGO_PKG_VERSION").to_string(),
            status: MigrationStatus::Successful,
            duration_ms,
            failed_script_path: None,
            failed_script_error: None,
            additional_artifacts: Vec::new(),
        }
    }

    /// Entry for a version whose script at `script_path` failed with `error`.
    pub fn failed(
        version: Version,
        duration_ms: u64,
        script_path: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: MigrationStatus::Failed,
            failed_script_path: Some(script_path.into()),
            failed_script_error: Some(error.into()),
            ..Self::successful(version, duration_ms)
        }
    }

    /// Override the tool name and version recorded with this entry.
    pub fn with_tool(mut self, tool: impl Into<String>, tool_version: impl Into<String>) -> Self {
        self.applied_by_tool = tool.into();
        self.applied_by_tool_version = tool_version.into();
        self
    }

    /// Attach additional artifacts to this entry.
    pub fn with_artifacts(mut self, artifacts: Vec<String>) -> Self {
        self.additional_artifacts = artifacts;
        self
    }

    /// Serialize `additional_artifacts` for storage.
    ///
    /// Returns `None` when there are no artifacts so the column stays NULL.
    pub fn artifacts_json(&self) -> CoreResult<Option<String>> {
        if self.additional_artifacts.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(&self.additional_artifacts)?))
    }
}

/// A ledger row as read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Monotonic id assigned by the store on insert
    pub sequence_id: i64,

    /// Version this row records
    pub version: Version,

    /// When the row was last written
    pub applied_on_utc: DateTime<Utc>,

    /// User who ran the migration
    pub applied_by_user: String,

    /// Tool that applied the version
    pub applied_by_tool: String,

    /// Version of the tool
    pub applied_by_tool_version: String,

    /// Outcome
    pub status: MigrationStatus,

    /// Wall-clock time spent applying the version
    pub duration_ms: u64,

    /// Script that failed, if any
    pub failed_script_path: Option<String>,

    /// Error raised by the failing script, if any
    pub failed_script_error: Option<String>,

    /// Extra files recorded with the version
    pub additional_artifacts: Vec<String>,
}

impl MigrationRecord {
    /// Decode a stored artifacts column back into a list.
    ///
    /// `NULL` and empty strings both decode to an empty list.
    pub fn parse_artifacts(raw: Option<&str>) -> CoreResult<Vec<String>> {
        match raw {
            None => Ok(Vec::new()),
            Some(s) if s.trim().is_empty() => Ok(Vec::new()),
            Some(s) => Ok(serde_json::from_str(s)?),
        }
    }

    /// Whether this row counts towards the current version.
    pub fn is_successful(&self) -> bool {
        self.status == MigrationStatus::Successful
    }
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
