use super::*;

fn segment(script: &str) -> SqlResult<Vec<String>> {
    BatchSegmenter::new(ScriptSyntax::SQL_SERVER).segment(script)
}

#[test]
fn test_splits_on_go() {
    let batches = segment("SELECT 1\nGO\nSELECT 2").unwrap();
    assert_eq!(batches, vec!["SELECT 1", "SELECT 2"]);
}

#[test]
fn test_go_in_line_comment_does_not_split() {
    let batches = segment("SELECT 1 -- GO\nSELECT 2").unwrap();
    assert_eq!(batches, vec!["SELECT 1 -- GO\nSELECT 2"]);
}

#[test]
fn test_go_in_block_comment_does_not_split() {
    let script = "SELECT 1\n/*\nGO\n*/\nSELECT 2";
    let batches = segment(script).unwrap();
    assert_eq!(batches, vec![script]);
}

#[test]
fn test_go_in_string_does_not_split() {
    let script = "INSERT INTO notes VALUES ('first\nGO\nlast')";
    let batches = segment(script).unwrap();
    assert_eq!(batches, vec![script]);
}

#[test]
fn test_n_separators_yield_n_plus_one_batches() {
    let script = "CREATE TABLE a (id INT)\nGO\nCREATE TABLE b (id INT)\ngo\nCREATE TABLE c (id INT)\n  GO  \nSELECT 1";
    let batches = segment(script).unwrap();
    assert_eq!(batches.len(), 4);
    assert_eq!(batches[2], "CREATE TABLE c (id INT)");
}

#[test]
fn test_empty_batches_dropped() {
    let batches = segment("GO\n\nGO\n   \nSELECT 1\nGO\nGO\n").unwrap();
    assert_eq!(batches, vec!["SELECT 1"]);
}

#[test]
fn test_empty_script() {
    assert!(segment("").unwrap().is_empty());
    assert!(segment("  \n\t\n").unwrap().is_empty());
}

#[test]
fn test_repeat_count_re_emits_batch() {
    let batches = segment("INSERT INTO t DEFAULT VALUES\nGO 3\nSELECT COUNT(*) FROM t").unwrap();
    assert_eq!(
        batches,
        vec![
            "INSERT INTO t DEFAULT VALUES",
            "INSERT INTO t DEFAULT VALUES",
            "INSERT INTO t DEFAULT VALUES",
            "SELECT COUNT(*) FROM t",
        ]
    );
}

#[test]
fn test_preserves_inner_lines_and_comments() {
    let script = "-- header\nCREATE PROCEDURE p AS\nBEGIN\n    SELECT 1; /* body */\nEND\nGO\nEXEC p";
    let batches = segment(script).unwrap();
    assert_eq!(
        batches[0],
        "-- header\nCREATE PROCEDURE p AS\nBEGIN\n    SELECT 1; /* body */\nEND"
    );
    assert_eq!(batches[1], "EXEC p");
}

#[test]
fn test_crlf_line_endings() {
    let batches = segment("SELECT 1\r\nGO\r\nSELECT 2\r\n").unwrap();
    assert_eq!(batches, vec!["SELECT 1", "SELECT 2"]);
}

#[test]
fn test_resegmenting_rejoined_batches_is_stable() {
    let script = "/* setup */\nCREATE TABLE t (v NVARCHAR(10))\nGO\nINSERT INTO t VALUES ('GO')\nGO 2\n-- GO\nSELECT * FROM [GO]";
    let first = segment(script).unwrap();
    let rejoined = first.join("\nGO\n");
    let second = segment(&rejoined).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_comment_closing_go_line_stays_in_batch() {
    let script = "SELECT 1 /* start\nend */ GO\nSELECT 2";
    let first = segment(script).unwrap();
    assert_eq!(first, vec![script]);

    let second = segment(&first.join("\nGO\n")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unterminated_block_comment() {
    let err = segment("SELECT 1\nGO\n/* never closed\nSELECT 2").unwrap_err();
    assert_eq!(err, SqlError::UnterminatedComment { line: 3 });
    assert_eq!(err.line(), 3);
}

#[test]
fn test_unterminated_nested_comment_reports_outer_line() {
    let err = segment("/* outer\n/* inner */\nSELECT 1").unwrap_err();
    assert_eq!(err, SqlError::UnterminatedComment { line: 1 });
}

#[test]
fn test_unterminated_string() {
    let err = segment("SELECT 1\nGO\nSELECT 'oops\nGO\nSELECT 2").unwrap_err();
    assert_eq!(
        err,
        SqlError::UnterminatedQuote {
            delimiter: '\'',
            line: 3
        }
    );
}

#[test]
fn test_unterminated_bracket_identifier() {
    let err = segment("SELECT * FROM [dbo.users").unwrap_err();
    assert!(matches!(err, SqlError::UnterminatedQuote { delimiter: '[', line: 1 }));
}

#[test]
fn test_duckdb_script_is_single_batch() {
    let segmenter = BatchSegmenter::new(ScriptSyntax::DUCKDB);
    let batches = segmenter
        .segment("CREATE TABLE a (id INT);\nGO\nCREATE TABLE b (id INT);\n")
        .unwrap();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].starts_with("CREATE TABLE a"));
}

#[test]
fn test_duckdb_still_rejects_unterminated_comment() {
    let segmenter = BatchSegmenter::new(ScriptSyntax::DUCKDB);
    assert!(segmenter.segment("SELECT 1; /* open").is_err());
}
