//! Batch segmentation
//!
//! Splits a script at separator lines. The separator lines themselves are
//! dropped, as are batches that are empty or whitespace-only. Each batch is
//! the script text between separators with surrounding whitespace trimmed,
//! so rejoining the batches with separator lines yields a script that
//! segments to the same batches.

use crate::classifier::{LineClassifier, LineKind};
use crate::error::{SqlError, SqlResult};
use crate::syntax::ScriptSyntax;

/// Splits raw scripts into executable batches for one dialect.
///
/// Holds no mutable state; one instance can segment any number of scripts,
/// from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct BatchSegmenter {
    classifier: LineClassifier,
}

impl BatchSegmenter {
    pub fn new(syntax: ScriptSyntax) -> Self {
        Self {
            classifier: LineClassifier::new(syntax),
        }
    }

    /// Split `raw_script` into ordered batches.
    ///
    /// Fails without returning any batch when the script ends inside a block
    /// comment or a quoted string/identifier.
    pub fn segment(&self, raw_script: &str) -> SqlResult<Vec<String>> {
        let mut state = self.classifier.initial_state();
        let mut batches = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for (idx, line) in raw_script.lines().enumerate() {
            match self.classifier.classify(line, idx + 1, &mut state) {
                LineKind::Separator { repeat } => {
                    flush(&mut current, repeat, &mut batches);
                }
                LineKind::Content => current.push(line),
            }
        }

        if let Some(line) = state.comments.opened_at() {
            return Err(SqlError::UnterminatedComment { line });
        }
        if let Some(open) = state.quote {
            return Err(SqlError::UnterminatedQuote {
                delimiter: open.style.open,
                line: open.line,
            });
        }

        flush(&mut current, 1, &mut batches);
        log::debug!("Segmented script into {} batch(es)", batches.len());
        Ok(batches)
    }
}

fn flush(current: &mut Vec<&str>, repeat: u32, batches: &mut Vec<String>) {
    let text = current.join("\n");
    current.clear();

    let text = text.trim();
    if text.is_empty() {
        return;
    }
    for _ in 0..repeat {
        batches.push(text.to_string());
    }
}

#[cfg(test)]
#[path = "segmenter_test.rs"]
mod tests;
