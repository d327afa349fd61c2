//! SQL literal and identifier utilities
//!
//! Ledger identifiers (database, schema, table) are substituted verbatim into
//! quoted identifier positions, so they are restricted to plain names. Values
//! are rendered as single-quoted literals.

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render `value` as a single-quoted SQL string literal.
///
/// # Examples
/// ```
/// use tm_core::sql_utils::quote_literal;
/// assert_eq!(quote_literal("v1.00"), "'v1.00'");
/// assert_eq!(quote_literal("it's"), "'it''s'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

/// Whether `name` is a plain identifier: ASCII letters, digits and `_`,
/// not starting with a digit.
///
/// # Examples
/// ```
/// use tm_core::sql_utils::is_plain_identifier;
/// assert!(is_plain_identifier("__tidemark_version"));
/// assert!(!is_plain_identifier("dbo]; DROP TABLE x; --"));
/// ```
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
