use std::path::Path;
use std::sync::Arc;

use miette::NamedSource;

use crate::errors::BtreeError;

/// A named unit of source text. The name is what diagnostics print as their
/// source identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    /// Create a source from already loaded content.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a source from disk, naming it after its path.
    pub fn read(path: &Path) -> Result<Self, BtreeError> {
        let content = std::fs::read_to_string(path).map_err(|source| BtreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_file(path.display().to_string(), content))
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}
