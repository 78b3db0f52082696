//! Error types for gantry-host

/// Result type for host-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by evaluation and capability callbacks.
///
/// Callbacks are registered by higher layers that carry their own error
/// taxonomies; the host model transports them opaquely and callers downcast
/// on the way out.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the host build model
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A task with the same name is already registered in the container.
    #[error("task '{name}' is already registered")]
    DuplicateTask { name: String },

    /// No task with this name exists in the container.
    #[error("task '{name}' not found")]
    UnknownTask { name: String },

    /// `after_evaluate` was called on a project whose evaluation already ran.
    #[error("project '{project}' has already been evaluated")]
    AlreadyEvaluated { project: String },

    /// Task materialization was requested before the project was evaluated.
    #[error("project '{project}' has not been evaluated")]
    NotEvaluated { project: String },

    /// An after-evaluate callback failed.
    #[error("evaluation of project '{project}' failed: {source}")]
    Evaluation {
        project: String,
        #[source]
        source: CallbackError,
    },

    /// A capability listener fired on plugin application and failed.
    #[error("capability listener for plugin '{plugin}' on project '{project}' failed: {source}")]
    PluginCallback {
        project: String,
        plugin: String,
        #[source]
        source: CallbackError,
    },

    /// A realized task depends on a task that does not exist.
    #[error("task '{task}' depends on unknown task '{dependency}'")]
    MissingDependency { task: String, dependency: String },

    /// The realized task graph contains a cycle.
    #[error("task dependency cycle involving: {}", participants.join(", "))]
    DependencyCycle { participants: Vec<String> },
}
