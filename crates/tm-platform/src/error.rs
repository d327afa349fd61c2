//! Error types for tm-platform

use crate::template::Placeholder;
use thiserror::Error;

/// Platform errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Operation not offered by the active platform (P001)
    #[error("[P001] {operation} is not supported by the {platform} platform")]
    UnsupportedOperation {
        platform: &'static str,
        operation: &'static str,
    },

    /// Opening a connection failed (P002)
    #[error("[P002] Connection to {target} failed: {message}")]
    Connection { target: String, message: String },
}

impl PlatformError {
    pub(crate) fn unsupported(platform: &'static str, operation: &'static str) -> Self {
        PlatformError::UnsupportedOperation {
            platform,
            operation,
        }
    }
}

/// Template binding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `${...}` token that is not part of the vocabulary (T001)
    #[error("[T001] Unknown placeholder '{0}'")]
    UnknownPlaceholder(String),

    /// `${` with no closing brace (T002)
    #[error("[T002] Unterminated placeholder token at byte {offset}")]
    UnterminatedToken { offset: usize },

    /// Template uses a placeholder with no bound value (T003)
    #[error("[T003] No value bound for placeholder {0}")]
    Unbound(Placeholder),

    /// Identifier value that cannot be substituted safely (T004)
    #[error("[T004] Invalid identifier '{value}' for placeholder {placeholder}")]
    InvalidIdentifier {
        placeholder: Placeholder,
        value: String,
    },

    /// Value of the wrong kind bound to a placeholder (T005)
    #[error("[T005] Placeholder {placeholder} expects {expected}")]
    KindMismatch {
        placeholder: Placeholder,
        expected: &'static str,
    },
}

/// Result type alias for PlatformError
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Result type alias for TemplateError
pub type TemplateResult<T> = Result<T, TemplateError>;
