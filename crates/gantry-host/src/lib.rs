//! Host build-tool model for Gantry.
//!
//! This crate models the slice of a host build tool that container image
//! wiring needs: a workspace of projects, plugin capabilities with one-shot
//! listeners, lazily-configured tasks, an evaluation lifecycle, and
//! materialization of the full task graph in dependency-first order.

pub mod error;
pub mod graph;
pub mod project;
pub mod session;
pub mod task;
pub mod workspace;

pub use error::{CallbackError, Error, Result};
pub use graph::TaskGraph;
pub use project::{
    CallbackResult, CapabilityCallback, Dependency, DependencyGrouping, EvalCallback, Project,
};
pub use session::Session;
pub use task::{Task, TaskContainer, TaskName, TaskRef};
pub use workspace::{ProjectId, Workspace};
