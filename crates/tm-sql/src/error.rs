//! Error types for tm-sql

use thiserror::Error;

/// Script segmentation errors
///
/// Segmentation is all-or-nothing: when one of these is returned no batch of
/// the script has been produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// Block comment still open at end of script (S001)
    #[error("[S001] Unterminated block comment opened at line {line}")]
    UnterminatedComment { line: usize },

    /// String literal or quoted identifier still open at end of script (S002)
    #[error("[S002] Unterminated {delimiter}-quoted text opened at line {line}")]
    UnterminatedQuote { delimiter: char, line: usize },
}

impl SqlError {
    /// 1-based line where the offending construct was opened.
    pub fn line(&self) -> usize {
        match self {
            SqlError::UnterminatedComment { line } | SqlError::UnterminatedQuote { line, .. } => {
                *line
            }
        }
    }
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
