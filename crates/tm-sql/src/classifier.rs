//! Per-line lexical classification
//!
//! [`LineClassifier::classify`] scans one line left to right, updating the
//! [`LexState`] carried over from the previous line, and reports whether the
//! line is a batch separator. Only text that is in code state and outside
//! any string or quoted identifier takes part in separator matching:
//!
//! - inside a block comment, everything up to the matching `*/` is skipped
//!   and the remainder is scanned as code, but a line that begins inside a
//!   comment is never a separator, since dropping it would drop the `*/`;
//! - `--` in code state hides the rest of the line;
//! - an opened quote hides everything until its closing delimiter, on this
//!   or a later line.

use crate::comment::CommentTracker;
use crate::syntax::{QuoteStyle, ScriptSyntax};

/// A quote that was opened and not yet closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenQuote {
    pub style: QuoteStyle,
    pub line: usize,
}

/// Scanner state threaded through consecutive [`LineClassifier::classify`] calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexState {
    pub comments: CommentTracker,
    pub quote: Option<OpenQuote>,
}

impl LexState {
    /// Whether the scanner is in plain code state.
    pub fn is_code(&self) -> bool {
        !self.comments.is_open() && self.quote.is_none()
    }
}

/// Classification of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Ordinary script text (code, comments, literals)
    Content,
    /// A separator line; the preceding batch is emitted `repeat` times
    Separator { repeat: u32 },
}

/// Classifies lines according to one dialect's [`ScriptSyntax`]
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier {
    syntax: ScriptSyntax,
}

impl LineClassifier {
    pub fn new(syntax: ScriptSyntax) -> Self {
        Self { syntax }
    }

    /// Syntax rules in use.
    pub fn syntax(&self) -> &ScriptSyntax {
        &self.syntax
    }

    /// Fresh state for the first line of a script.
    pub fn initial_state(&self) -> LexState {
        LexState {
            comments: CommentTracker::new(self.syntax.nested_block_comments),
            quote: None,
        }
    }

    /// Classify `line` (1-based number `line_no`), advancing `state` past it.
    pub fn classify(&self, line: &str, line_no: usize, state: &mut LexState) -> LineKind {
        let chars: Vec<char> = line.chars().collect();
        let mut code = String::with_capacity(line.len());
        let mut quoted = state.quote.is_some();
        let continues_comment = state.comments.is_open();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if state.comments.is_open() {
                if c == '*' && next == Some('/') {
                    state.comments.close();
                    i += 2;
                } else if c == '/' && next == Some('*') && state.comments.accepts_opener() {
                    state.comments.open(line_no);
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            if let Some(open) = state.quote {
                if c == open.style.close {
                    if next == Some(open.style.close) {
                        i += 2;
                        continue;
                    }
                    state.quote = None;
                }
                i += 1;
                continue;
            }

            match (c, next) {
                ('-', Some('-')) => break,
                ('/', Some('*')) => {
                    state.comments.open(line_no);
                    code.push(' ');
                    i += 2;
                }
                _ => {
                    if let Some(style) = self.syntax.quote_opened_by(c) {
                        state.quote = Some(OpenQuote {
                            style,
                            line: line_no,
                        });
                        quoted = true;
                    } else {
                        code.push(c);
                    }
                    i += 1;
                }
            }
        }

        if quoted || continues_comment || state.comments.is_open() {
            return LineKind::Content;
        }
        self.match_separator(&code)
    }

    /// Match the code-visible text of a line against the separator directive.
    fn match_separator(&self, code: &str) -> LineKind {
        let Some(separator) = self.syntax.separator else {
            return LineKind::Content;
        };

        let mut words = code.split_whitespace();
        let Some(first) = words.next() else {
            return LineKind::Content;
        };
        if !first.eq_ignore_ascii_case(separator.token) {
            return LineKind::Content;
        }

        match (words.next(), words.next()) {
            (None, _) => LineKind::Separator { repeat: 1 },
            (Some(count), None) if separator.repeat_count => match count.parse::<u32>() {
                Ok(repeat) if repeat > 0 => LineKind::Separator { repeat },
                _ => LineKind::Content,
            },
            _ => LineKind::Content,
        }
    }
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
