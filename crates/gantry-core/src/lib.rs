//! Core orchestration layer for Gantry
//!
//! This crate wires container image builds into a host build system,
//! implementing:
//!
//! - **Plugin application**: Version gating, task registration, and
//!   post-evaluation dependency wiring against the host workspace
//! - **Configuration**: TOML `gantry.toml` files resolved into typed,
//!   validated build settings
//! - **Extension pipeline**: Ordered, fail-fast configuration transforms
//!   supplied by third parties
//! - **Build runner**: A facade driving one build through resolve,
//!   extend, and engine invocation with scoped staging and log forwarding
//! - **Introspection**: JSON payloads for dev-loop sync and setup tooling
//!
//! # Architecture
//!
//! `gantry-core` sits between the host build model and the image engine:
//!
//! ```text
//!        gantry-host (workspace, projects, tasks)
//!                        |
//!                   gantry-core
//!                   /         \
//!       gantry-extensions   gantry-engine
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gantry_core::{GantryPlugin, RawConfiguration, Result};
//!
//! fn apply(ws: &mut gantry_host::Workspace, id: gantry_host::ProjectId) -> Result<()> {
//!     let config = RawConfiguration::load_for_project(ws.project(id))?;
//!     GantryPlugin::apply(ws, id, &config)
//! }
//! ```

pub mod config;
pub mod error;
pub mod introspect;
pub mod plugin;
pub mod runner;
pub mod tasks;
pub mod version;
pub mod wiring;

pub use config::{
    CONFIG_FILE_NAME, ContainerSection, ExtensionSection, ImageSection, OutputSection,
    RawConfiguration, ResolvedConfiguration,
};
pub use error::{BuildError, ConfigField, HostFailure, Result, translate};
pub use introspect::{
    InitReport, InputFiles, SyncMap, SyncMapEntry, init_report, input_files, sync_map,
};
pub use plugin::GantryPlugin;
pub use runner::{BuildRunner, RunnerState};
pub use tasks::{
    BUILD_DAEMON_TASK, BUILD_IMAGE_TASK, BUILD_TAR_TASK, FAIL_IF_OUT_OF_DATE_TASK, FILES_TASK,
    IMAGE_TASKS, INIT_TASK, ImageBuildKind, SYNC_MAP_TASK, TASK_GROUP, TASK_TABLE, TaskKind,
    TaskSpec,
};
pub use version::{REQUIRED_VERSION_PROPERTY, compatible_version};
pub use wiring::{
    APPLICATION_PLUGIN, BASE_PLUGIN, BOOT_PLUGIN, RUNTIME_TARGET_PROPERTY, WEB_PLUGIN,
    wire_dependencies,
};
