use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::BtreeError;

/// Extension of behavior tree scripts.
pub const SCRIPT_EXTENSION: &str = "btree";

/// Expands command-line paths into the scripts to check.
///
/// Directories are walked recursively for `.btree` files, sorted so reports come out in
/// a stable order. Any other path is taken as given, whatever its extension.
pub fn discover_scripts<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>, BtreeError> {
    let mut scripts = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            scripts.extend(scripts_under(path)?);
        } else {
            scripts.push(path.to_path_buf());
        }
    }
    tracing::debug!(count = scripts.len(), "discovered scripts");
    Ok(scripts)
}

fn scripts_under(root: &Path) -> Result<Vec<PathBuf>, BtreeError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !is_script(entry.path()) {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// Returns true if the path has a `.btree` extension.
pub fn is_script(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION)
}
