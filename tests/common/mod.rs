//! Shared helpers for the integration tests.
//!
//! Fixture scripts under `tests/fixtures` state the diagnostics they should produce in
//! comment lines of the form `# expect: <line>:<column>: <message>`. Comments are
//! transparent to the lexer, so the expectations never disturb the script itself.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use btree::{Analysis, Pipeline, SourceFile};
use walkdir::WalkDir;

const EXPECT_PREFIX: &str = "# expect: ";

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn fixture(relative: &str) -> PathBuf {
    fixtures_dir().join(relative)
}

/// All `.btree` fixtures under `dir`, sorted.
pub fn fixtures_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "btree"))
        .collect();
    files.sort();
    files
}

/// The `line:column: message` lines a fixture expects.
pub fn expectations(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix(EXPECT_PREFIX))
        .map(str::to_string)
        .collect()
}

pub fn analyze(content: &str) -> Analysis {
    Pipeline::new().analyze(&SourceFile::from_file("test.btree", content))
}

/// Diagnostics rendered the way fixtures state them.
pub fn rendered(analysis: &Analysis) -> Vec<String> {
    analysis
        .diagnostics
        .iter()
        .map(|d| format!("{}:{}: {}", d.line, d.column, d.message))
        .collect()
}
