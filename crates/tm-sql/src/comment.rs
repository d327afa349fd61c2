//! Block comment nesting state carried from line to line

/// Tracks how deep inside `/* ... */` the scanner currently is.
///
/// With nesting disabled the depth never exceeds 1 and an inner `/*` is
/// plain comment text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentTracker {
    depth: u32,
    nested: bool,
    opened_at: Option<usize>,
}

impl CommentTracker {
    /// Create a tracker outside any comment.
    pub fn new(nested: bool) -> Self {
        Self {
            depth: 0,
            nested,
            opened_at: None,
        }
    }

    /// Whether the scanner is inside a block comment.
    pub fn is_open(&self) -> bool {
        self.depth > 0
    }

    /// Current nesting depth (0 outside comments).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Line on which the outermost open comment started.
    pub fn opened_at(&self) -> Option<usize> {
        self.opened_at
    }

    /// Whether an opener seen at the current position starts a new level.
    pub fn accepts_opener(&self) -> bool {
        self.depth == 0 || self.nested
    }

    /// Record a `/*` on `line`.
    pub fn open(&mut self, line: usize) {
        if !self.accepts_opener() {
            return;
        }
        if self.depth == 0 {
            self.opened_at = Some(line);
        }
        self.depth += 1;
    }

    /// Record a `*/`. Closing when no comment is open is a no-op.
    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.opened_at = None;
        }
    }
}
