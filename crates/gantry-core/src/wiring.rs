//! Post-evaluation wiring: which tasks the image builds wait on.
//!
//! Queued by [`GantryPlugin::apply`](crate::plugin::GantryPlugin::apply) and
//! drained exactly once when the project evaluates. Every edge is additive;
//! nothing here removes a prerequisite.

use gantry_host::{CallbackResult, ProjectId, TaskRef, Workspace};
use tracing::debug;

use crate::config::RawConfiguration;
use crate::error::{BuildError, Result};
use crate::tasks::{IMAGE_TASKS, SYNC_MAP_TASK};

/// Host plugin providing the aggregate `assemble` task.
pub const BASE_PLUGIN: &str = "base";
/// Host plugin providing `compile` and `archive`.
pub const APPLICATION_PLUGIN: &str = "application";
/// Host plugin providing `webArchive`.
pub const WEB_PLUGIN: &str = "web";
/// Repackaging plugin: provides `bootWebArchive` alongside the web plugin,
/// and disables the plain `archive` task otherwise.
pub const BOOT_PLUGIN: &str = "boot";

/// Aggregate packaging task of the base plugin.
pub const ASSEMBLE_TASK: &str = "assemble";
/// Compiled-output task of the application plugin.
pub const COMPILE_TASK: &str = "compile";
/// Primary archive task of the application plugin.
pub const ARCHIVE_TASK: &str = "archive";
/// Web archive task of the web plugin.
pub const WEB_ARCHIVE_TASK: &str = "webArchive";
/// Repackaged web archive task of the boot plugin.
pub const BOOT_WEB_ARCHIVE_TASK: &str = "bootWebArchive";

/// Project property naming the runtime major version the build targets.
pub const RUNTIME_TARGET_PROPERTY: &str = "runtime.target";

/// Classifier the shim puts on the re-enabled archive so its output stays
/// distinct from the boot-repackaged one.
const BOOT_ORIGINAL_CLASSIFIER: &str = "original";

/// Wire the prerequisites of this project's image-build tasks.
///
/// Policy, first match wins:
/// 1. web archives present behind their plugins: depend on whichever of
///    `webArchive` / `bootWebArchive` exist (both if both);
/// 2. containerizing mode `"packaged"` (compared as a raw string; the
///    literal is validated later, when the build resolves): depend on
///    `archive`; when the `boot` plugin would otherwise skip that task,
///    force-enable it and label its output `original`. The shim is keyed
///    to that single plugin id and is idempotent; simultaneous
///    repackaging plugins are out of scope;
/// 3. otherwise (exploded default): depend on `compile`.
///
/// Steps 1-3 attach to the three image tasks and the sync-map task.
/// Independently, every in-workspace project dependency gets a one-shot
/// listener on its `base` plugin that adds its `assemble` task to the three
/// image tasks only.
pub fn wire_dependencies(
    ws: &mut Workspace,
    project: ProjectId,
    config: &RawConfiguration,
) -> Result<()> {
    let prerequisites = archive_prerequisites(ws, project, config)?;
    debug!(
        project = %ws.project(project).name(),
        prerequisites = ?prerequisites.iter().map(|p| p.task.as_str()).collect::<Vec<_>>(),
        "wiring image task prerequisites"
    );

    let tasks = ws.project_mut(project).tasks_mut();
    for consumer in IMAGE_TASKS.into_iter().chain([SYNC_MAP_TASK]) {
        let edges = prerequisites.clone();
        tasks
            .configure(consumer, move |task| {
                for edge in edges {
                    task.add_dependency(edge);
                }
            })
            .map_err(BuildError::from_host)?;
    }

    wire_project_dependencies(ws, project)
}

/// Steps 1-3: the in-project tasks the image builds wait on.
fn archive_prerequisites(
    ws: &mut Workspace,
    project: ProjectId,
    config: &RawConfiguration,
) -> Result<Vec<TaskRef>> {
    let model = ws.project(project);
    let project_name = model.name().to_string();

    let mut archives = Vec::new();
    if model.has_plugin(WEB_PLUGIN) && model.tasks().contains(WEB_ARCHIVE_TASK) {
        archives.push(TaskRef::new(project, WEB_ARCHIVE_TASK));
    }
    if model.has_plugin(BOOT_PLUGIN) && model.tasks().contains(BOOT_WEB_ARCHIVE_TASK) {
        archives.push(TaskRef::new(project, BOOT_WEB_ARCHIVE_TASK));
    }
    if !archives.is_empty() {
        return Ok(archives);
    }

    if config.container.mode.as_deref() == Some("packaged") {
        if ws.project(project).has_plugin(BOOT_PLUGIN) {
            // boot disables the plain archive when it repackages in place;
            // bring it back with a distinct output label
            let result = ws
                .project_mut(project)
                .tasks_mut()
                .configure(ARCHIVE_TASK, |task| {
                    task.enabled = true;
                    task.artifact_classifier = Some(BOOT_ORIGINAL_CLASSIFIER.to_string());
                });
            result.map_err(|_| missing_application_task(&project_name, ARCHIVE_TASK))?;
        }
        let name = ws
            .project(project)
            .tasks()
            .named(ARCHIVE_TASK)
            .map_err(|_| missing_application_task(&project_name, ARCHIVE_TASK))?;
        return Ok(vec![TaskRef::new(project, name.as_str())]);
    }

    let name = ws
        .project(project)
        .tasks()
        .named(COMPILE_TASK)
        .map_err(|_| missing_application_task(&project_name, COMPILE_TASK))?;
    Ok(vec![TaskRef::new(project, name.as_str())])
}

fn missing_application_task(project_name: &str, task: &str) -> BuildError {
    BuildError::MissingPrerequisiteTask {
        task: task.to_string(),
        project: project_name.to_string(),
        capability: APPLICATION_PLUGIN.to_string(),
    }
}

/// Step 4: deferred cross-project `assemble` edges.
///
/// The order in which the host applies plugins across projects is not
/// guaranteed, so the edge waits for the dependency's `base` capability
/// instead of assuming it.
fn wire_project_dependencies(ws: &mut Workspace, project: ProjectId) -> Result<()> {
    for dependency in ws.project(project).project_dependencies() {
        let consumer = project;
        ws.when_plugin_applied(
            dependency,
            BASE_PLUGIN,
            Box::new(move |ws| deferred_assemble_edge(ws, consumer, dependency)),
        )
        .map_err(BuildError::from_host)?;
    }
    Ok(())
}

/// Listener body: the dependency gained its base packaging capability, so
/// its `assemble` output now feeds the consumer's image builds.
fn deferred_assemble_edge(
    ws: &mut Workspace,
    consumer: ProjectId,
    dependency: ProjectId,
) -> CallbackResult {
    let provider = ws.project(dependency);
    if !provider.tasks().contains(ASSEMBLE_TASK) {
        return Err(Box::new(BuildError::MissingPrerequisiteTask {
            task: ASSEMBLE_TASK.to_string(),
            project: provider.name().to_string(),
            capability: BASE_PLUGIN.to_string(),
        }));
    }
    debug!(
        consumer = %ws.project(consumer).name(),
        provider = %ws.project(dependency).name(),
        "adding deferred assemble edge"
    );

    let edge = TaskRef::new(dependency, ASSEMBLE_TASK);
    let tasks = ws.project_mut(consumer).tasks_mut();
    for image_task in IMAGE_TASKS {
        let edge = edge.clone();
        tasks.configure(image_task, move |task| task.add_dependency(edge))?;
    }
    Ok(())
}
