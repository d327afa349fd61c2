//! End-to-end segmentation of realistic migration scripts through the
//! public tm-sql API.

use tm_sql::{BatchSegmenter, ScriptSyntax, SqlError};

const VERSION_SCRIPT: &str = r#"
/*
 * v1.02 - ticket tables
 * Batches are separated by GO.
 */
IF OBJECT_ID('[dbo].[tickets]') IS NULL
BEGIN
    CREATE TABLE [dbo].[tickets] (
        [id] INT IDENTITY(1,1) NOT NULL,
        [title] NVARCHAR(200) NOT NULL, -- shown in lists; never 'GO'
        [body] NVARCHAR(MAX) NULL
    );
END
GO

CREATE OR ALTER VIEW [dbo].[open tickets] AS
    SELECT [id], [title] FROM [dbo].[tickets] /* GO */;
GO

INSERT INTO [dbo].[tickets] ([title], [body]) VALUES (N'Printer', N'Paper jam
GO
still jammed');
GO
"#;

#[test]
fn test_version_script_batches() {
    let batches = BatchSegmenter::new(ScriptSyntax::SQL_SERVER)
        .segment(VERSION_SCRIPT)
        .unwrap();

    assert_eq!(batches.len(), 3);
    assert!(batches[0].starts_with("/*"));
    assert!(batches[0].ends_with("END"));
    assert!(batches[1].starts_with("CREATE OR ALTER VIEW [dbo].[open tickets]"));
    assert!(batches[2].contains("Paper jam\nGO\nstill jammed"));
}

#[test]
fn test_version_script_is_stable_under_rejoin() {
    let segmenter = BatchSegmenter::new(ScriptSyntax::SQL_SERVER);
    let batches = segmenter.segment(VERSION_SCRIPT).unwrap();
    let again = segmenter.segment(&batches.join("\nGO\n")).unwrap();
    assert_eq!(batches, again);
}

#[test]
fn test_separator_count_matches_batch_count() {
    let segmenter = BatchSegmenter::new(ScriptSyntax::SQL_SERVER);
    for n in 0..5 {
        let script = (0..=n)
            .map(|i| format!("SELECT {i} -- GO"))
            .collect::<Vec<_>>()
            .join("\nGO\n");
        assert_eq!(segmenter.segment(&script).unwrap().len(), n + 1);
    }
}

#[test]
fn test_malformed_script_yields_no_batches() {
    let script = format!("{VERSION_SCRIPT}\nSELECT 1 /* forgot to close\nGO\n");
    let result = BatchSegmenter::new(ScriptSyntax::SQL_SERVER).segment(&script);
    match result {
        Err(SqlError::UnterminatedComment { line }) => {
            assert_eq!(line, VERSION_SCRIPT.lines().count() + 2);
        }
        other => panic!("expected unterminated comment, got {other:?}"),
    }
}

#[test]
fn test_segmenter_shared_across_threads() {
    let segmenter = BatchSegmenter::new(ScriptSyntax::SQL_SERVER);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                segmenter
                    .segment(&format!("SELECT {i}\nGO\nSELECT {i}"))
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), 2);
    }
}
