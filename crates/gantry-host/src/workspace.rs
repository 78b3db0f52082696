//! Workspace arena: project storage, plugin capabilities, evaluation.

use tracing::debug;

use crate::error::{Error, Result};
use crate::project::{CapabilityCallback, Project};
use crate::session::Session;

/// Opaque handle to a project inside a [`Workspace`].
///
/// Ids are minted by [`Workspace::create_project`] and are only meaningful
/// for the workspace that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectId(pub(crate) usize);

/// The host build model: a session plus an arena of projects.
///
/// Projects are stored in creation order and addressed by [`ProjectId`];
/// every mutation goes through the workspace so callbacks can reach any
/// project, not just their own.
pub struct Workspace {
    session: Session,
    projects: Vec<Project>,
}

impl Workspace {
    /// Create an empty workspace for a session.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            projects: Vec::new(),
        }
    }

    /// The host session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access to the host session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Add a project and return its handle.
    pub fn create_project(&mut self, name: impl Into<String>, root: impl Into<std::path::PathBuf>) -> ProjectId {
        let id = ProjectId(self.projects.len());
        let project = Project::new(name, root);
        debug!(project = %project.name(), index = id.0, "project created");
        self.projects.push(project);
        id
    }

    /// Borrow a project.
    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }

    /// Mutably borrow a project.
    pub fn project_mut(&mut self, id: ProjectId) -> &mut Project {
        &mut self.projects[id.0]
    }

    /// Find a project by name.
    pub fn find_project(&self, name: &str) -> Option<ProjectId> {
        self.projects
            .iter()
            .position(|p| p.name() == name)
            .map(ProjectId)
    }

    /// All project handles in creation order.
    pub fn project_ids(&self) -> impl Iterator<Item = ProjectId> {
        (0..self.projects.len()).map(ProjectId)
    }

    /// Number of projects.
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Apply a plugin capability to a project.
    ///
    /// Fires every listener queued for this capability, in registration
    /// order, then forgets them. Applying a plugin a second time is a no-op;
    /// listeners never fire twice.
    ///
    /// # Errors
    ///
    /// The first listener failure is returned as [`Error::PluginCallback`];
    /// listeners queued after the failing one are dropped.
    pub fn apply_plugin(&mut self, id: ProjectId, plugin: &str) -> Result<()> {
        if !self.projects[id.0].record_plugin(plugin) {
            return Ok(());
        }
        debug!(project = %self.projects[id.0].name(), plugin, "plugin applied");

        let queued = std::mem::take(&mut self.projects[id.0].capability_listeners);
        let (matched, rest): (Vec<_>, Vec<_>) =
            queued.into_iter().partition(|(candidate, _)| candidate == plugin);
        self.projects[id.0].capability_listeners = rest;

        for (_, callback) in matched {
            callback(self).map_err(|source| Error::PluginCallback {
                project: self.projects[id.0].name().to_string(),
                plugin: plugin.to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Run `callback` once the project has the given plugin capability.
    ///
    /// If the plugin is already applied the callback runs immediately;
    /// otherwise it is queued and fires (once) when the plugin arrives. A
    /// plugin that never arrives means the callback never runs, which is not
    /// an error.
    pub fn when_plugin_applied(
        &mut self,
        id: ProjectId,
        plugin: &str,
        callback: CapabilityCallback,
    ) -> Result<()> {
        if self.projects[id.0].has_plugin(plugin) {
            return callback(self).map_err(|source| Error::PluginCallback {
                project: self.projects[id.0].name().to_string(),
                plugin: plugin.to_string(),
                source,
            });
        }
        self.projects[id.0]
            .capability_listeners
            .push((plugin.to_string(), callback));
        Ok(())
    }

    /// Evaluate a project: drain its end-of-evaluation callbacks exactly
    /// once, in registration order. Callbacks may queue further callbacks;
    /// those run in the same drain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyEvaluated`] on a second call, and wraps the
    /// first callback failure as [`Error::Evaluation`]. A failed evaluation
    /// still counts as evaluated.
    pub fn evaluate(&mut self, id: ProjectId) -> Result<()> {
        let name = self.projects[id.0].name().to_string();
        if self.projects[id.0].evaluated {
            return Err(Error::AlreadyEvaluated { project: name });
        }
        debug!(project = %name, "evaluating project");

        loop {
            let callbacks = std::mem::take(&mut self.projects[id.0].after_evaluate);
            if callbacks.is_empty() {
                break;
            }
            for callback in callbacks {
                if let Err(source) = callback(self, id) {
                    self.projects[id.0].evaluated = true;
                    return Err(Error::Evaluation {
                        project: name,
                        source,
                    });
                }
            }
        }
        self.projects[id.0].evaluated = true;
        Ok(())
    }
}
