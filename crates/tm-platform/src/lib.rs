//! tm-platform - Platform capabilities for Tidemark
//!
//! Each supported engine is described by one immutable [`Platform`] value:
//! capability flags, the SQL templates the migration engine runs against the
//! ledger, the script syntax used for batch segmentation, and classification
//! of native driver errors. The engine selects a platform once, through
//! [`platform_for`], and afterwards only consults flags and templates.

pub mod capabilities;
pub mod classify;
pub mod duckdb;
pub mod error;
pub mod sqlserver;
pub mod template;

pub use capabilities::{Capabilities, ConnectionSummary, Platform};
pub use classify::ErrorClassification;
pub use self::duckdb::DuckDbPlatform;
pub use error::{PlatformError, PlatformResult, TemplateError, TemplateResult};
pub use sqlserver::{ServerError, SqlServerClient, SqlServerError, SqlServerPlatform};
pub use template::{Bindings, BoundValue, Placeholder, Template};

use tm_core::{Config, PlatformKind};

/// Build the platform described by `config`.
pub fn platform_for(config: &Config) -> Box<dyn Platform> {
    log::debug!("Selected {} platform", config.platform);
    match config.platform {
        PlatformKind::SqlServer => Box::new(SqlServerPlatform::from_config(config)),
        PlatformKind::DuckDb => Box::new(DuckDbPlatform::from_config(config)),
    }
}
