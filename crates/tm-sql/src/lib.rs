//! tm-sql - Script segmentation for Tidemark
//!
//! Splits a raw multi-statement migration script into independently
//! executable batches at dialect-specific separator lines (`GO` on SQL
//! Server), ignoring look-alike tokens inside comments, string literals and
//! quoted identifiers. Statements are never parsed or validated.

pub mod classifier;
pub mod comment;
pub mod error;
pub mod segmenter;
pub mod syntax;

pub use classifier::{LexState, LineClassifier, LineKind};
pub use comment::CommentTracker;
pub use error::{SqlError, SqlResult};
pub use segmenter::BatchSegmenter;
pub use syntax::{BatchSeparator, QuoteStyle, ScriptSyntax};
