//! The failure taxonomy and the single translation boundary.
//!
//! Every way a gantry build can fail is a [`BuildError`] variant; the enum
//! is matched exhaustively, so adding a failure kind forces an update to the
//! translation table. [`translate`] consumes the error and produces the
//! distinct [`HostFailure`] type, which makes translating twice
//! uncompilable rather than merely discouraged.

use std::path::PathBuf;

use gantry_engine::InvalidImageReference;
use gantry_extensions::PipelineFailure;

use crate::version::REQUIRED_VERSION_PROPERTY;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// The configuration field an invalid value was found in.
///
/// Closed set: remediation text in [`translate`] matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    BaseImage,
    TargetImage,
    AppRoot,
    WorkingDirectory,
    Volume,
    CreationTime,
    ModificationTime,
    ContainerizingMode,
    RequiredVersion,
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BaseImage => "image.base",
            Self::TargetImage => "image.target",
            Self::AppRoot => "container.app_root",
            Self::WorkingDirectory => "container.working_directory",
            Self::Volume => "container.volumes",
            Self::CreationTime => "container.creation_time",
            Self::ModificationTime => "container.files_modification_time",
            Self::ContainerizingMode => "container.mode",
            Self::RequiredVersion => REQUIRED_VERSION_PROPERTY,
        };
        f.write_str(name)
    }
}

/// Everything that can terminate a gantry task.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The running tool version is older than the configured requirement.
    #[error("gantry version is {actual} but is required to be at least {required}")]
    VersionMismatch { required: String, actual: String },

    /// A task the wiring policy depends on was never registered.
    #[error("could not find task '{task}' on project '{project}'")]
    MissingPrerequisiteTask {
        task: String,
        project: String,
        /// The plugin whose absence most likely explains the missing task.
        capability: String,
    },

    /// A configuration field holds a value that fails validation.
    #[error("invalid {field}: '{value}': {reason}")]
    InvalidConfigurationValue {
        field: ConfigField,
        value: String,
        reason: String,
    },

    /// An extension in the pipeline failed.
    #[error(transparent)]
    ExtensionExecution(#[from] PipelineFailure),

    /// The base image's runtime cannot run what the project targets.
    #[error(
        "base image runtime major version {base_major} cannot run an application targeting major version {target_major}"
    )]
    IncompatibleBaseImage { base_major: u32, target_major: u32 },

    /// An image coordinate string failed to parse.
    #[error(transparent)]
    InvalidImageReference(#[from] InvalidImageReference),

    /// The engine reported a failure.
    #[error(transparent)]
    Engine(#[from] gantry_engine::Error),

    /// The gantry configuration file could not be read.
    #[error("failed to read gantry configuration at {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The gantry configuration file is not valid TOML.
    #[error("failed to parse gantry configuration at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Anything outside the taxonomy, preserved rather than dropped.
    #[error("{message}")]
    Unexpected {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BuildError {
    /// Wrap an error from outside the taxonomy, keeping its message and
    /// cause chain.
    pub fn unexpected(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Unexpected {
            message: context.into(),
            source: Some(source.into()),
        }
    }

    /// Recover the build error carried inside a host-model failure.
    ///
    /// Wiring callbacks cross the host boundary as boxed errors; evaluation
    /// and capability-listener failures come back wrapped. Anything that is
    /// not a [`BuildError`] underneath is wrapped as [`Self::Unexpected`].
    pub fn from_host(error: gantry_host::Error) -> Self {
        use gantry_host::Error as HostError;
        match error {
            HostError::Evaluation { source, .. } | HostError::PluginCallback { source, .. } => {
                match source.downcast::<BuildError>() {
                    Ok(build) => *build,
                    Err(other) => Self::unexpected("host callback failed", other),
                }
            }
            other => Self::unexpected("host build model rejected the operation", other),
        }
    }
}

/// A host-facing failure: what went wrong, plus remediation text where
/// gantry can tell what to do about it.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HostFailure {
    message: String,
    suggestion: Option<String>,
    #[source]
    source: BuildError,
}

impl HostFailure {
    /// The user-facing description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Remediation text, when the failure kind has one.
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// The untranslated failure this was built from.
    pub fn build_error(&self) -> &BuildError {
        &self.source
    }
}

/// Map a failure to its host-facing form.
///
/// Total over the taxonomy; applied exactly once, at the top boundary of a
/// task execution. Consuming the [`BuildError`] keeps the cause chain intact
/// through [`HostFailure`]'s source.
pub fn translate(error: BuildError) -> HostFailure {
    use gantry_engine::Error as EngineError;

    let (message, suggestion) = match &error {
        BuildError::VersionMismatch { required, actual } => (
            format!("gantry version is {actual} but is required to be at least {required}"),
            Some(format!(
                "upgrade gantry, or relax the '{REQUIRED_VERSION_PROPERTY}' property"
            )),
        ),
        BuildError::MissingPrerequisiteTask {
            task,
            project,
            capability,
        } => (
            format!("could not find task '{task}' on project '{project}'"),
            Some(format!(
                "perhaps you did not apply the '{capability}' plugin?"
            )),
        ),
        BuildError::InvalidConfigurationValue {
            field,
            value,
            reason,
        } => {
            let suggestion = match field {
                ConfigField::BaseImage => "set image.base to the image to build upon",
                ConfigField::TargetImage => "set image.target to the image reference to publish",
                ConfigField::AppRoot
                | ConfigField::WorkingDirectory
                | ConfigField::Volume => "use an absolute Unix-style path such as '/app'",
                ConfigField::CreationTime => {
                    "use an ISO 8601 date-time, 'EPOCH', or 'USE_CURRENT_TIMESTAMP'"
                }
                ConfigField::ModificationTime => {
                    "use an ISO 8601 date-time or 'EPOCH_PLUS_SECOND'"
                }
                ConfigField::ContainerizingMode => "use 'exploded' or 'packaged'",
                ConfigField::RequiredVersion => "use a semantic version such as '1.2.3'",
            };
            (
                format!("invalid {field}: '{value}': {reason}"),
                Some(suggestion.to_string()),
            )
        }
        BuildError::ExtensionExecution(failure) => (
            failure.to_string(),
            Some("fix the extension's configuration, or remove its [[extensions]] entry".to_string()),
        ),
        BuildError::IncompatibleBaseImage {
            base_major,
            target_major,
        } => (
            format!(
                "base image runtime major version {base_major} cannot run an application targeting major version {target_major}"
            ),
            Some(format!(
                "choose a base image at major version {target_major} or newer"
            )),
        ),
        BuildError::InvalidImageReference(source) => (
            source.to_string(),
            Some("use the form registry/repository:tag".to_string()),
        ),
        BuildError::Engine(engine) => {
            let suggestion = match engine {
                EngineError::CacheDirectory { .. } => {
                    Some("set cache_dir to a writable directory".to_string())
                }
                EngineError::EntrypointInference { .. } => {
                    Some("set container.entrypoint explicitly".to_string())
                }
                EngineError::Io(_) | EngineError::Build { .. } => None,
            };
            (engine.to_string(), suggestion)
        }
        BuildError::ConfigRead { path, .. } => (
            format!("failed to read gantry configuration at {}", path.display()),
            Some("check that the file exists and is readable".to_string()),
        ),
        BuildError::ConfigParse { path, .. } => (
            format!("failed to parse gantry configuration at {}", path.display()),
            Some("check the TOML syntax of the gantry configuration".to_string()),
        ),
        BuildError::Unexpected { message, .. } => (message.clone(), None),
    };

    HostFailure {
        message,
        suggestion,
        source: error,
    }
}
