//! Ledger SQL templates and placeholder binding
//!
//! Templates are plain SQL text carrying `${TIDEMARK_*}` tokens. The set of
//! tokens is closed ([`Placeholder`]); a template naming anything else fails
//! to render. Binding happens here, in one pass over the template, so a
//! substituted value is never rescanned for further tokens.
//!
//! Identifier placeholders are substituted verbatim and must therefore be
//! plain identifiers. Every other placeholder is a value and renders as a
//! quoted literal, `NULL`, or a bare integer.

use crate::error::{TemplateError, TemplateResult};
use std::collections::HashMap;
use std::fmt;
use tm_core::sql_utils::{is_plain_identifier, quote_literal};

const TOKEN_OPEN: &str = "${";
const TOKEN_CLOSE: char = '}';

/// Closed vocabulary of template placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    DatabaseName,
    SchemaName,
    TableName,
    Version,
    AppliedByUser,
    AppliedByTool,
    AppliedByToolVersion,
    Status,
    DurationMs,
    FailedScriptPath,
    FailedScriptError,
    AdditionalArtifacts,
}

impl Placeholder {
    pub const ALL: [Placeholder; 12] = [
        Placeholder::DatabaseName,
        Placeholder::SchemaName,
        Placeholder::TableName,
        Placeholder::Version,
        Placeholder::AppliedByUser,
        Placeholder::AppliedByTool,
        Placeholder::AppliedByToolVersion,
        Placeholder::Status,
        Placeholder::DurationMs,
        Placeholder::FailedScriptPath,
        Placeholder::FailedScriptError,
        Placeholder::AdditionalArtifacts,
    ];

    /// Name as written between `${` and `}`.
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::DatabaseName => "TIDEMARK_DB_NAME",
            Placeholder::SchemaName => "TIDEMARK_SCHEMA_NAME",
            Placeholder::TableName => "TIDEMARK_TABLE_NAME",
            Placeholder::Version => "TIDEMARK_VERSION",
            Placeholder::AppliedByUser => "TIDEMARK_APPLIED_BY_USER",
            Placeholder::AppliedByTool => "TIDEMARK_APPLIED_BY_TOOL",
            Placeholder::AppliedByToolVersion => "TIDEMARK_APPLIED_BY_TOOL_VERSION",
            Placeholder::Status => "TIDEMARK_STATUS",
            Placeholder::DurationMs => "TIDEMARK_DURATION_MS",
            Placeholder::FailedScriptPath => "TIDEMARK_FAILED_SCRIPT_PATH",
            Placeholder::FailedScriptError => "TIDEMARK_FAILED_SCRIPT_ERROR",
            Placeholder::AdditionalArtifacts => "TIDEMARK_ADDITIONAL_ARTIFACTS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Full token, e.g. `${TIDEMARK_TABLE_NAME}`.
    pub fn token(&self) -> String {
        format!("{TOKEN_OPEN}{}{TOKEN_CLOSE}", self.name())
    }

    /// Whether the placeholder stands for an object name rather than a value.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self,
            Placeholder::DatabaseName | Placeholder::SchemaName | Placeholder::TableName
        )
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TOKEN_OPEN}{}{TOKEN_CLOSE}", self.name())
    }
}

/// One piece of a parsed template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Token(Placeholder),
}

/// SQL text with placeholder tokens, owned by a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template(&'static str);

impl Template {
    pub const fn new(sql: &'static str) -> Self {
        Self(sql)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Placeholders used by the template, in order of first appearance.
    pub fn placeholders(&self) -> TemplateResult<Vec<Placeholder>> {
        let mut found = Vec::new();
        for piece in parse(self.0)? {
            if let Piece::Token(p) = piece {
                if !found.contains(&p) {
                    found.push(p);
                }
            }
        }
        Ok(found)
    }

    /// Substitute every token from `bindings`.
    pub fn render(&self, bindings: &Bindings) -> TemplateResult<String> {
        bindings.render(*self)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn parse(sql: &str) -> TemplateResult<Vec<Piece<'_>>> {
    let mut pieces = Vec::new();
    let mut rest = sql;
    let mut offset = 0;

    while let Some(start) = rest.find(TOKEN_OPEN) {
        if start > 0 {
            pieces.push(Piece::Text(&rest[..start]));
        }
        let after = &rest[start + TOKEN_OPEN.len()..];
        let end = after
            .find(TOKEN_CLOSE)
            .ok_or(TemplateError::UnterminatedToken {
                offset: offset + start,
            })?;
        let name = &after[..end];
        let placeholder = Placeholder::from_name(name)
            .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
        pieces.push(Piece::Token(placeholder));

        let consumed = start + TOKEN_OPEN.len() + end + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    Ok(pieces)
}

/// Value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// Object name, substituted verbatim
    Identifier(String),
    /// Text value; `None` renders as `NULL`
    Text(Option<String>),
    /// Non-negative integer value
    Integer(u64),
}

impl BoundValue {
    fn kind(&self) -> &'static str {
        match self {
            BoundValue::Identifier(_) => "an identifier",
            BoundValue::Text(_) => "a text value",
            BoundValue::Integer(_) => "an integer value",
        }
    }
}

/// Values for the placeholders of one statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: HashMap<Placeholder, BoundValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an object name.
    pub fn identifier(mut self, placeholder: Placeholder, name: impl Into<String>) -> Self {
        self.values
            .insert(placeholder, BoundValue::Identifier(name.into()));
        self
    }

    /// Bind a text value.
    pub fn text(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.values
            .insert(placeholder, BoundValue::Text(Some(value.into())));
        self
    }

    /// Bind a nullable text value.
    pub fn optional_text(mut self, placeholder: Placeholder, value: Option<String>) -> Self {
        self.values.insert(placeholder, BoundValue::Text(value));
        self
    }

    /// Bind an integer value.
    pub fn integer(mut self, placeholder: Placeholder, value: u64) -> Self {
        self.values.insert(placeholder, BoundValue::Integer(value));
        self
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&BoundValue> {
        self.values.get(&placeholder)
    }

    /// Render `template`, substituting every token in a single pass.
    pub fn render(&self, template: Template) -> TemplateResult<String> {
        let sql = template.as_str();
        let mut out = String::with_capacity(sql.len());

        for piece in parse(sql)? {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Token(placeholder) => {
                    let value = self
                        .values
                        .get(&placeholder)
                        .ok_or(TemplateError::Unbound(placeholder))?;
                    out.push_str(&render_value(placeholder, value)?);
                }
            }
        }
        Ok(out)
    }
}

fn render_value(placeholder: Placeholder, value: &BoundValue) -> TemplateResult<String> {
    if placeholder.is_identifier() {
        return match value {
            BoundValue::Identifier(name) if is_plain_identifier(name) => Ok(name.clone()),
            BoundValue::Identifier(name) => Err(TemplateError::InvalidIdentifier {
                placeholder,
                value: name.clone(),
            }),
            _ => Err(TemplateError::KindMismatch {
                placeholder,
                expected: "an identifier",
            }),
        };
    }

    match (placeholder, value) {
        (Placeholder::DurationMs, BoundValue::Integer(n)) => Ok(n.to_string()),
        (Placeholder::DurationMs, _) => Err(TemplateError::KindMismatch {
            placeholder,
            expected: BoundValue::Integer(0).kind(),
        }),
        (_, BoundValue::Text(Some(text))) => Ok(quote_literal(text)),
        (_, BoundValue::Text(None)) => Ok("NULL".to_string()),
        (_, _) => Err(TemplateError::KindMismatch {
            placeholder,
            expected: BoundValue::Text(None).kind(),
        }),
    }
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
