//! [`TestWorkspace`] host fixture and host-ecosystem plugin simulation.

use std::fs;
use std::path::PathBuf;

use gantry_host::{ProjectId, Session, Workspace};
use tempfile::TempDir;

/// A host workspace whose projects are rooted in one temporary directory.
///
/// # Example
///
/// ```rust,no_run
/// use gantry_test_utils::{TestWorkspace, apply_host_plugin};
///
/// let mut fixture = TestWorkspace::new();
/// let app = fixture.add_project("app");
/// apply_host_plugin(fixture.workspace_mut(), app, "application").unwrap();
/// ```
pub struct TestWorkspace {
    temp: TempDir,
    workspace: Workspace,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Tool version the fixture session reports.
    pub const TOOL_VERSION: &'static str = "2.3.1";

    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("TestWorkspace: failed to create temp dir"),
            workspace: Workspace::new(Session::new(Self::TOOL_VERSION)),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Create a project rooted in a fresh directory under the fixture temp.
    pub fn add_project(&mut self, name: &str) -> ProjectId {
        let root = self.temp.path().join(name);
        fs::create_dir_all(&root).expect("TestWorkspace: failed to create project root");
        self.workspace.create_project(name, root)
    }

    /// A path under the fixture temp for scratch output. Not created.
    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }
}

/// Simulate applying a host-ecosystem plugin by id.
///
/// Registers the tasks the real plugin would contribute, then records the
/// capability so queued listeners fire against a complete task set.
/// Recognised ids:
///
/// - `base` — registers `assemble`
/// - `application` — implies `base`; registers `compile` and `archive`
/// - `web` — implies `application`; registers `webArchive`
/// - `boot` — with `web` present registers `bootWebArchive`; otherwise
///   disables `archive` the way a repackaging plugin hijacks it
///
/// # Panics
/// Panics on an unrecognised plugin id.
pub fn apply_host_plugin(
    ws: &mut Workspace,
    project: ProjectId,
    plugin: &str,
) -> gantry_host::Result<()> {
    if ws.project(project).has_plugin(plugin) {
        return Ok(());
    }

    match plugin {
        "base" => {
            ws.project_mut(project).tasks_mut().register("assemble")?;
        }
        "application" => {
            apply_host_plugin(ws, project, "base")?;
            let tasks = ws.project_mut(project).tasks_mut();
            tasks.register("compile")?;
            tasks.register("archive")?;
        }
        "web" => {
            apply_host_plugin(ws, project, "application")?;
            ws.project_mut(project).tasks_mut().register("webArchive")?;
        }
        "boot" => {
            if ws.project(project).has_plugin("web") {
                ws.project_mut(project)
                    .tasks_mut()
                    .register("bootWebArchive")?;
            } else {
                // repackaging replaces the plain archive output
                ws.project_mut(project)
                    .tasks_mut()
                    .configure("archive", |task| task.enabled = false)?;
            }
        }
        other => panic!("apply_host_plugin: unrecognised plugin id '{other}'"),
    }

    ws.apply_plugin(project, plugin)
}
