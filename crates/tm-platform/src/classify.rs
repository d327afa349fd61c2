//! Classification of native driver errors

use std::error::Error;

/// Outcome of asking a platform to explain a driver error.
///
/// `recognized` is false for errors that do not come from the platform's
/// driver; callers then fall back to the error's own display text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorClassification {
    pub recognized: bool,
    pub message: Option<String>,
}

impl ErrorClassification {
    pub fn recognized(message: impl Into<String>) -> Self {
        Self {
            recognized: true,
            message: Some(message.into()),
        }
    }

    pub fn unrecognized() -> Self {
        Self::default()
    }

    /// The classified message, or `error`'s display text when unrecognized.
    pub fn message_or(&self, error: &dyn Error) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => error.to_string(),
        }
    }
}

/// Walk `error` and its sources, returning the first `T` found.
///
/// Driver errors often arrive wrapped by the caller's own error types.
pub(crate) fn find_source<'a, T: Error + 'static>(
    error: &'a (dyn Error + 'static),
) -> Option<&'a T> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<T>() {
            return Some(found);
        }
        current = err.source();
    }
    None
}
