use super::*;

const INSERT: Template = Template::new(
    "INSERT INTO \"${TIDEMARK_SCHEMA_NAME}\".\"${TIDEMARK_TABLE_NAME}\" (version, duration_ms, failed_script_path) \
     VALUES (${TIDEMARK_VERSION}, ${TIDEMARK_DURATION_MS}, ${TIDEMARK_FAILED_SCRIPT_PATH});",
);

fn ledger_bindings() -> Bindings {
    Bindings::new()
        .identifier(Placeholder::SchemaName, "main")
        .identifier(Placeholder::TableName, "__tidemark_version")
}

#[test]
fn test_placeholder_names_round_trip() {
    for p in Placeholder::ALL {
        assert_eq!(Placeholder::from_name(p.name()), Some(p));
        assert_eq!(p.token(), format!("${{{}}}", p.name()));
    }
    assert_eq!(Placeholder::from_name("TIDEMARK_NOPE"), None);
}

#[test]
fn test_identifier_placeholders() {
    let identifiers: Vec<_> = Placeholder::ALL
        .into_iter()
        .filter(Placeholder::is_identifier)
        .collect();
    assert_eq!(
        identifiers,
        vec![
            Placeholder::DatabaseName,
            Placeholder::SchemaName,
            Placeholder::TableName
        ]
    );
}

#[test]
fn test_template_placeholders_in_order() {
    assert_eq!(
        INSERT.placeholders().unwrap(),
        vec![
            Placeholder::SchemaName,
            Placeholder::TableName,
            Placeholder::Version,
            Placeholder::DurationMs,
            Placeholder::FailedScriptPath,
        ]
    );
}

#[test]
fn test_render_substitutes_all_kinds() {
    let sql = ledger_bindings()
        .text(Placeholder::Version, "1.00")
        .integer(Placeholder::DurationMs, 42)
        .optional_text(Placeholder::FailedScriptPath, None)
        .render(INSERT)
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO \"main\".\"__tidemark_version\" (version, duration_ms, failed_script_path) \
         VALUES ('1.00', 42, NULL);"
    );
}

#[test]
fn test_render_escapes_text() {
    let sql = ledger_bindings()
        .text(Placeholder::Version, "1.00'); DROP TABLE x; --")
        .integer(Placeholder::DurationMs, 0)
        .optional_text(Placeholder::FailedScriptPath, Some("v1/it's.sql".into()))
        .render(INSERT)
        .unwrap();
    assert!(sql.contains("'1.00''); DROP TABLE x; --'"));
    assert!(sql.contains("'v1/it''s.sql'"));
}

#[test]
fn test_render_is_single_pass() {
    let sql = ledger_bindings()
        .text(Placeholder::Version, "${TIDEMARK_TABLE_NAME}")
        .integer(Placeholder::DurationMs, 1)
        .optional_text(Placeholder::FailedScriptPath, None)
        .render(INSERT)
        .unwrap();
    assert!(sql.contains("VALUES ('${TIDEMARK_TABLE_NAME}', 1, NULL)"));
}

#[test]
fn test_render_unbound_placeholder() {
    let err = ledger_bindings().render(INSERT).unwrap_err();
    assert_eq!(err, TemplateError::Unbound(Placeholder::Version));
}

#[test]
fn test_render_rejects_unsafe_identifier() {
    let err = Bindings::new()
        .identifier(Placeholder::SchemaName, "dbo]; DROP TABLE x; --")
        .render(Template::new("CREATE SCHEMA [${TIDEMARK_SCHEMA_NAME}];"))
        .unwrap_err();
    assert!(matches!(
        err,
        TemplateError::InvalidIdentifier {
            placeholder: Placeholder::SchemaName,
            ..
        }
    ));
}

#[test]
fn test_render_kind_mismatch() {
    let err = Bindings::new()
        .text(Placeholder::SchemaName, "dbo")
        .render(Template::new("CREATE SCHEMA [${TIDEMARK_SCHEMA_NAME}];"))
        .unwrap_err();
    assert!(matches!(err, TemplateError::KindMismatch { .. }));

    let err = Bindings::new()
        .text(Placeholder::DurationMs, "12")
        .render(Template::new("SELECT ${TIDEMARK_DURATION_MS};"))
        .unwrap_err();
    assert!(matches!(
        err,
        TemplateError::KindMismatch {
            placeholder: Placeholder::DurationMs,
            ..
        }
    ));
}

#[test]
fn test_unknown_placeholder() {
    let template = Template::new("SELECT ${TIDEMARK_SECRET};");
    assert_eq!(
        template.placeholders().unwrap_err(),
        TemplateError::UnknownPlaceholder("TIDEMARK_SECRET".to_string())
    );
}

#[test]
fn test_unterminated_token() {
    let template = Template::new("SELECT 1, ${TIDEMARK_VERSION");
    assert_eq!(
        template.render(&Bindings::new()).unwrap_err(),
        TemplateError::UnterminatedToken { offset: 10 }
    );
}

#[test]
fn test_text_without_tokens_passes_through() {
    let template = Template::new("SELECT $1, '{x}';");
    assert_eq!(template.render(&Bindings::new()).unwrap(), "SELECT $1, '{x}';");
}
