//! Generation errors.
//!
//! Validation outcomes are *not* errors: [`crate::validate::ValidationReport`]
//! is data returned to the caller, who decides whether warnings are fatal.

use std::path::PathBuf;

/// Everything that can abort a `generate` call.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The configuration failed boundary validation. `generate` checks at
    /// entry and returns this before touching the filesystem.
    #[error("invalid part configuration: {0}")]
    Configuration(String),

    /// A geometric operation (tessellation, hole subtraction, fillet)
    /// produced no usable solid.
    #[error("geometry construction failed: {0}")]
    Geometry(String),

    /// Writing one of the artifact formats failed.
    #[error("failed to write {path}: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external kernel process failed, timed out, or produced an
    /// invalid file. Fatal for the request; never retried here.
    #[error("external kernel failed: {0}")]
    Subprocess(String),
}

impl GenerateError {
    pub(crate) fn encoding(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Encoding { path: path.into(), source }
    }
}
