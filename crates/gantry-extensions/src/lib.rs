//! Extension system for Gantry builds.
//!
//! Third parties transform the build configuration before the engine runs:
//! each extension is a [`BuildExtension`] registered under an id, selected
//! and ordered by the project's descriptor list, and applied as a strict
//! left fold by [`run_pipeline`].

pub mod descriptor;
pub mod error;
pub mod extension;
pub mod pipeline;
pub mod registry;

pub use descriptor::ExtensionDescriptor;
pub use error::{ExtensionError, PipelineFailure, Result};
pub use extension::{BuildExtension, ExtensionContext};
pub use pipeline::run_pipeline;
pub use registry::ExtensionRegistry;
