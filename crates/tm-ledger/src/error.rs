//! Error types for the ledger.

use std::error::Error;
use thiserror::Error;
use tm_core::CoreError;
use tm_platform::{Platform, PlatformError, TemplateError};

/// Ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Insert of a version the ledger already holds (L001).
    #[error("[L001] Version '{version}' is already recorded in the ledger")]
    DuplicateVersion { version: String },

    /// Native driver failure, classified by the platform when possible (L002).
    #[error("[L002] Ledger statement failed: {message}")]
    Driver {
        message: String,
        recognized: bool,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// Operation not offered by the platform (L003).
    #[error("[L003] {0}")]
    Platform(#[from] PlatformError),

    /// Template could not be bound (L004).
    #[error("[L004] {0}")]
    Template(#[from] TemplateError),

    /// In-place update matched no row (L005).
    #[error("[L005] Version '{version}' is not recorded in the ledger")]
    VersionNotFound { version: String },

    /// Stored row could not be decoded (L006).
    #[error("[L006] Invalid ledger row: {message}")]
    InvalidRecord { message: String },

    /// Entry could not be encoded (L007).
    #[error("[L007] {0}")]
    Record(#[from] CoreError),
}

/// Result type alias for [`LedgerError`].
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Wrap a native error, asking `platform` to classify it.
    pub(crate) fn driver<E>(platform: &dyn Platform, err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let classification = platform.classify_error(&err);
        if !classification.recognized {
            log::warn!(
                "Unrecognized {} driver error: {}",
                platform.name(),
                err
            );
        }
        LedgerError::Driver {
            message: classification.message_or(&err),
            recognized: classification.recognized,
            source: Box::new(err),
        }
    }
}
