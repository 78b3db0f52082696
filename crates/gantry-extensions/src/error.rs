//! Errors raised by extensions and by the pipeline runner.

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineFailure>;

/// A typed failure signalled by one extension.
///
/// Extensions construct these; the runner never does, except when a
/// configured extension id has no registered implementation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExtensionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExtensionError {
    /// Failure with a message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Failure with a message and an underlying cause.
    pub fn with_cause(
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(cause.into()),
        }
    }
}

/// The pipeline stopped at a failing extension.
///
/// `position` is the zero-based index in the caller's descriptor list, so
/// the same extension id configured twice is still unambiguous.
#[derive(Debug, thiserror::Error)]
#[error("extension '{id}' at position {position} failed: {source}")]
pub struct PipelineFailure {
    /// Zero-based index of the failing descriptor.
    pub position: usize,
    /// The failing descriptor's extension id.
    pub id: String,
    #[source]
    pub source: ExtensionError,
}
