use super::*;
use crate::error::PlatformError;

/// Minimal platform with no update template and a configurable upsert flag.
struct SketchPlatform {
    capabilities: Capabilities,
}

impl SketchPlatform {
    fn new(upsert_support: bool) -> Self {
        Self {
            capabilities: Capabilities {
                transactional_ddl: false,
                schema_support: false,
                batch_support: true,
                upsert_support,
                default_schema: "",
                default_table: "ledger",
            },
        }
    }
}

impl Platform for SketchPlatform {
    fn name(&self) -> &'static str {
        "sketch"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn script_syntax(&self) -> ScriptSyntax {
        ScriptSyntax::SQL_SERVER
    }

    fn connection_summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            host: "localhost".into(),
            database: "sketch".into(),
        }
    }

    fn database_name(&self) -> &str {
        "sketch"
    }

    fn ledger_schema(&self) -> &str {
        self.capabilities.default_schema
    }

    fn ledger_table(&self) -> &str {
        self.capabilities.default_table
    }

    fn database_exists_query(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn create_database_statement(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn create_schema_statement(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn ledger_configured_query(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn ensure_ledger_table_statement(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn current_version_query(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn all_versions_query(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn insert_version_statement(&self) -> Template {
        Template::new("SELECT 1;")
    }

    fn upsert_template(&self) -> Option<Template> {
        Some(Template::new("SELECT 2;"))
    }

    fn classify_error(&self, _error: &(dyn Error + 'static)) -> ErrorClassification {
        ErrorClassification::unrecognized()
    }
}

#[test]
fn test_update_without_template_is_unsupported() {
    let platform = SketchPlatform::new(true);
    let err = platform.update_version_statement().unwrap_err();
    assert!(matches!(
        err,
        PlatformError::UnsupportedOperation {
            platform: "sketch",
            ..
        }
    ));
    assert!(err.to_string().starts_with("[P001]"));
}

#[test]
fn test_upsert_gated_by_capability() {
    let platform = SketchPlatform::new(false);
    assert!(matches!(
        platform.upsert_version_statement(),
        Err(PlatformError::UnsupportedOperation { .. })
    ));

    let platform = SketchPlatform::new(true);
    assert_eq!(
        platform.upsert_version_statement().unwrap().as_str(),
        "SELECT 2;"
    );
}

#[test]
fn test_default_segment_uses_script_syntax() {
    let platform = SketchPlatform::new(true);
    let batches = platform.segment("SELECT 1\nGO\nSELECT 2").unwrap();
    assert_eq!(batches, vec!["SELECT 1", "SELECT 2"]);
}

#[test]
fn test_default_has_no_ledger_upgrade() {
    assert!(SketchPlatform::new(true)
        .upgrade_ledger_table_statement()
        .is_none());
}

#[test]
fn test_default_unique_violation_is_false() {
    let platform = SketchPlatform::new(true);
    let err = std::io::Error::other("duplicate");
    assert!(!platform.is_unique_violation(&err));
}

#[test]
fn test_platform_is_object_safe() {
    let platforms: Vec<Box<dyn Platform>> = vec![Box::new(SketchPlatform::new(true))];
    assert_eq!(platforms[0].name(), "sketch");
}

#[test]
fn test_connection_summary_display() {
    let summary = SketchPlatform::new(true).connection_summary();
    assert_eq!(summary.to_string(), "localhost/sketch");
}
