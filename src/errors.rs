//! Errors for the fallible edges of the crate.
//!
//! The lexer, parser and validator never fail; they report [`Diagnostic`]s instead.
//! [`BtreeError`] covers what sits around them: reading files, loading configuration and
//! field manifests, walking directories and writing output.
//!
//! [`Diagnostic`]: crate::diagnostics::Diagnostic

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BtreeError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid field manifest in {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
