//! Containerization engine interface for Gantry.
//!
//! Everything the orchestration layer needs from an engine: image reference
//! parsing, in-container paths, the chainable build configuration, the log
//! event stream, and the [`ContainerEngine`] execution contract. Image
//! assembly itself lives behind that trait.

pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod path;
pub mod reference;

pub use config::{BuildConfiguration, ContainerizingMode, InvalidContainerizingMode};
pub use engine::{BuildTarget, BuiltImage, ContainerEngine};
pub use error::{Error, Result};
pub use log::{LogEvent, LogLevel, LogSink, NullSink};
pub use path::{ContainerPath, InvalidContainerPath};
pub use reference::{
    DEFAULT_REGISTRY, DEFAULT_TAG, ImageReference, InvalidImageReference,
    OFFICIAL_REPOSITORY_PREFIX,
};
