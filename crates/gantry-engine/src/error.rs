//! Engine-originated error types.

use std::path::PathBuf;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a containerization engine run.
///
/// Config-string parse failures have their own types next to the types they
/// guard ([`InvalidImageReference`](crate::reference::InvalidImageReference)
/// and friends); this enum covers what can go wrong once a build is under
/// way.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error during the build.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The layer cache directory could not be created or used.
    #[error("cannot create or use cache directory {path}")]
    CacheDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine could not infer an entrypoint for the application.
    #[error("could not infer an entrypoint: {message}")]
    EntrypointInference { message: String },

    /// The build itself failed, with an engine-defined message.
    #[error("build failed: {message}")]
    Build {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}
