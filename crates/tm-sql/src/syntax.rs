//! Per-dialect lexical conventions used during segmentation

/// A batch separator directive recognised on a line of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSeparator {
    /// Separator keyword, matched case-insensitively (`GO`)
    pub token: &'static str,
    /// Whether `<token> <n>` means "emit the preceding batch n times"
    pub repeat_count: bool,
}

/// A pair of delimiters that enclose a string literal or quoted identifier.
///
/// A doubled closing delimiter inside the quoted text is an escape, not a
/// close (`'it''s'`, `[a]]b]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteStyle {
    pub open: char,
    pub close: char,
}

/// The lexical rules a dialect applies to migration scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSyntax {
    /// Batch separator, or `None` when the dialect has no batch convention
    pub separator: Option<BatchSeparator>,
    /// Whether `/* /* */ */` nests
    pub nested_block_comments: bool,
    /// Recognised string and quoted-identifier delimiters
    pub quotes: &'static [QuoteStyle],
}

const SINGLE_QUOTE: QuoteStyle = QuoteStyle {
    open: '\'',
    close: '\'',
};

const DOUBLE_QUOTE: QuoteStyle = QuoteStyle {
    open: '"',
    close: '"',
};

const BRACKET: QuoteStyle = QuoteStyle {
    open: '[',
    close: ']',
};

impl ScriptSyntax {
    /// Transact-SQL as understood by sqlcmd and SSMS.
    pub const SQL_SERVER: ScriptSyntax = ScriptSyntax {
        separator: Some(BatchSeparator {
            token: "GO",
            repeat_count: true,
        }),
        nested_block_comments: true,
        quotes: &[SINGLE_QUOTE, DOUBLE_QUOTE, BRACKET],
    };

    /// DuckDB: whole scripts run as one batch.
    pub const DUCKDB: ScriptSyntax = ScriptSyntax {
        separator: None,
        nested_block_comments: true,
        quotes: &[SINGLE_QUOTE, DOUBLE_QUOTE],
    };

    /// Look up the quote style opened by `c`, if any.
    pub fn quote_opened_by(&self, c: char) -> Option<QuoteStyle> {
        self.quotes.iter().copied().find(|q| q.open == c)
    }
}
