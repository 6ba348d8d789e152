/// Crate-level error types for fatal doclinks conditions.
///
/// Broken links are not errors in this sense: they are collected into the
/// report as [`crate::types::LinkError`] values. Everything here aborts the run.
use std::path::PathBuf;

#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A markdown document (source or link target) could not be read.
    #[error("cannot read {}: {source}", path.display())]
    DocumentRead {
        /// Document that failed to load.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Report serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The repository root does not exist or cannot be resolved.
    #[error("repository root not found: {}", path.display())]
    RootNotFound {
        /// Root path as given on the command line.
        path: PathBuf,
    },

    /// TOML deserialization of `.doclinks.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watcher setup failed: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },
}
