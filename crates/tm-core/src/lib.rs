//! tm-core - Core library for Tidemark
//!
//! This crate provides the ledger record types, the migration version
//! newtype, configuration parsing, and SQL string helpers shared by the
//! segmenter, platform, and ledger crates.

pub mod config;
pub mod error;
pub mod record;
pub mod sql_utils;
pub mod version;

pub use config::{Config, ConnectionConfig, LedgerConfig, PlatformKind};
pub use error::{CoreError, CoreResult};
pub use record::{MigrationEntry, MigrationRecord, MigrationStatus};
pub use version::Version;
