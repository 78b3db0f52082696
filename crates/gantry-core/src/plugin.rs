//! Plugin entry point: version gate, task registration, wiring hand-off.

use gantry_host::{ProjectId, Workspace};
use tracing::{debug, info};

use crate::config::RawConfiguration;
use crate::error::{BuildError, HostFailure, Result, translate};
use crate::tasks::TASK_TABLE;
use crate::version::{REQUIRED_VERSION_PROPERTY, compatible_version};
use crate::wiring::wire_dependencies;

/// The gantry host plugin.
///
/// Applying it registers the task table and queues the post-evaluation
/// wiring; nothing else happens until the project evaluates.
pub struct GantryPlugin;

impl GantryPlugin {
    /// Plugin id recorded on the project.
    pub const ID: &'static str = "gantry";

    /// Apply the plugin to a project. Idempotent.
    ///
    /// The version gate runs first: a workspace that pins
    /// `gantry.requiredVersion` to something newer than the running tool
    /// aborts here, before any task is registered.
    pub fn apply(
        ws: &mut Workspace,
        project: ProjectId,
        config: &RawConfiguration,
    ) -> Result<()> {
        if ws.project(project).has_plugin(Self::ID) {
            return Ok(());
        }

        if let Some(required) = ws.session().property(REQUIRED_VERSION_PROPERTY) {
            let required = required.to_string();
            let actual = ws.session().tool_version().to_string();
            if !compatible_version(Some(&required), &actual)? {
                return Err(BuildError::VersionMismatch { required, actual });
            }
        }

        debug!(project = %ws.project(project).name(), "registering gantry tasks");
        let tasks = ws.project_mut(project).tasks_mut();
        for spec in TASK_TABLE {
            tasks.register(spec.name).map_err(BuildError::from_host)?;
            tasks
                .configure(spec.name, move |task| {
                    task.group = spec.group.map(str::to_string);
                    task.description = Some(spec.description.to_string());
                })
                .map_err(BuildError::from_host)?;
        }

        let wiring_config = config.clone();
        ws.project_mut(project)
            .after_evaluate(Box::new(move |ws, id| {
                wire_dependencies(ws, id, &wiring_config).map_err(|e| e.into())
            }))
            .map_err(BuildError::from_host)?;

        ws.apply_plugin(project, Self::ID)
            .map_err(BuildError::from_host)?;
        info!(project = %ws.project(project).name(), "gantry plugin applied");
        Ok(())
    }

    /// Evaluate a project, translating any wiring failure for the host.
    pub fn evaluate_project(
        ws: &mut Workspace,
        project: ProjectId,
    ) -> std::result::Result<(), HostFailure> {
        ws.evaluate(project)
            .map_err(|e| translate(BuildError::from_host(e)))
    }
}
