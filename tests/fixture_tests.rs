mod common;

use btree::{Pipeline, SourceFile};
use common::{expectations, fixtures_dir, fixtures_in, rendered};

#[test]
fn clean_fixtures_have_no_diagnostics() {
    let files = fixtures_in(&fixtures_dir().join("clean"));
    assert!(!files.is_empty());
    let pipeline = Pipeline::new();
    for path in files {
        let source = SourceFile::read(&path).unwrap();
        let analysis = pipeline.analyze(&source);
        assert!(
            analysis.diagnostics.is_empty(),
            "{}: {:?}",
            path.display(),
            rendered(&analysis)
        );
        assert!(analysis.tree.root().is_some());
    }
}

#[test]
fn error_fixtures_report_exactly_what_they_expect() {
    let files = fixtures_in(&fixtures_dir().join("errors"));
    assert!(!files.is_empty());
    let pipeline = Pipeline::new();
    for path in files {
        let source = SourceFile::read(&path).unwrap();
        let expected = expectations(&source.content);
        assert!(!expected.is_empty(), "{} states no expectations", path.display());

        let analysis = pipeline.analyze(&source);
        assert_eq!(rendered(&analysis), expected, "{}", path.display());
    }
}
