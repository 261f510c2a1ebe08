//! Field metadata for imported task classes.
//!
//! Imports bind an alias to a class path. Whatever backs that class (typically a host
//! language class with annotated fields) is described here only as a lookup from class
//! path to its declared fields. [`FieldManifest`] provides that lookup from a YAML file:
//!
//! ```yaml
//! com.rager.behavior.SetBehaviorState:
//!   - name: behavior
//!     type: String
//!     required: true
//!   - name: weight
//!     type: double
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::BtreeError;

/// One declared field of a task class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub required: bool,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            required,
        }
    }
}

/// Lookup from class path to declared fields.
pub trait FieldReflector: Send + Sync {
    /// `None` when the class is unknown.
    fn fields(&self, class_path: &str) -> Option<&[FieldInfo]>;
}

/// Field metadata keyed by class path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldManifest {
    classes: IndexMap<String, Vec<FieldInfo>>,
}

impl FieldManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_path: impl Into<String>, fields: Vec<FieldInfo>) {
        self.classes.insert(class_path.into(), fields);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_yaml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, BtreeError> {
        let content = std::fs::read_to_string(path).map_err(|source| BtreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::from_yaml_str(&content).map_err(|source| BtreeError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), classes = manifest.len(), "loaded field manifest");
        Ok(manifest)
    }
}

impl FieldReflector for FieldManifest {
    fn fields(&self, class_path: &str) -> Option<&[FieldInfo]> {
        self.classes.get(class_path).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_manifest() {
        let yaml = "\
com.example.Wander:
  - name: speed
    type: double
  - name: target
    type: String
    required: true
";
        let manifest = FieldManifest::from_yaml_str(yaml).unwrap();
        let fields = manifest.fields("com.example.Wander").unwrap();
        assert_eq!(
            fields,
            &[
                FieldInfo::new("speed", "double", false),
                FieldInfo::new("target", "String", true),
            ]
        );
        assert!(manifest.fields("com.example.Missing").is_none());
    }

    #[test]
    fn empty_manifest_is_allowed() {
        assert!(FieldManifest::from_yaml_str("  \n").unwrap().is_empty());
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        assert!(FieldManifest::from_yaml_str("com.example.Wander: 12").is_err());
    }
}
