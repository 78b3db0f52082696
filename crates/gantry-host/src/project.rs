//! Project model: plugins, dependency groupings, evaluation lifecycle.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{CallbackError, Error, Result};
use crate::task::TaskContainer;
use crate::workspace::{ProjectId, Workspace};

/// Callback run when a project finishes evaluating.
pub type EvalCallback = Box<dyn FnOnce(&mut Workspace, ProjectId) -> CallbackResult>;

/// Callback fired when a project gains a plugin capability.
pub type CapabilityCallback = Box<dyn FnOnce(&mut Workspace) -> CallbackResult>;

/// Result type for host callbacks.
pub type CallbackResult = std::result::Result<(), CallbackError>;

/// A dependency declared by a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Another project in the same workspace (source-controlled).
    Project(ProjectId),
    /// An external artifact identified by a coordinate string.
    External { coordinate: String },
}

/// A named grouping of declared dependencies ("implementation", "runtime",
/// "test", ...). The host defines the grouping names; this model treats them
/// as opaque.
#[derive(Debug, Clone)]
pub struct DependencyGrouping {
    /// Grouping name.
    pub name: String,
    /// Dependencies declared under this grouping.
    pub dependencies: Vec<Dependency>,
}

/// One project in the host workspace.
pub struct Project {
    name: String,
    root: PathBuf,
    build_file: PathBuf,
    source_roots: Vec<PathBuf>,
    properties: BTreeMap<String, String>,
    plugins: BTreeSet<String>,
    groupings: Vec<DependencyGrouping>,
    tasks: TaskContainer,
    pub(crate) after_evaluate: Vec<EvalCallback>,
    pub(crate) capability_listeners: Vec<(String, CapabilityCallback)>,
    pub(crate) evaluated: bool,
}

impl Project {
    pub(crate) fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let build_file = root.join("build.toml");
        Self {
            name: name.into(),
            root,
            build_file,
            source_roots: Vec::new(),
            properties: BTreeMap::new(),
            plugins: BTreeSet::new(),
            groupings: Vec::new(),
            tasks: TaskContainer::new(),
            after_evaluate: Vec::new(),
            capability_listeners: Vec::new(),
            evaluated: false,
        }
    }

    /// The project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The host build script for this project.
    pub fn build_file(&self) -> &Path {
        &self.build_file
    }

    /// Override the build script location.
    pub fn set_build_file(&mut self, path: impl Into<PathBuf>) {
        self.build_file = path.into();
    }

    /// Source roots watched by dev-loop tooling.
    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    /// Add a source root.
    pub fn add_source_root(&mut self, path: impl Into<PathBuf>) {
        self.source_roots.push(path.into());
    }

    /// Look up a string property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Set a string property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Whether a plugin with this id has been applied.
    pub fn has_plugin(&self, plugin: &str) -> bool {
        self.plugins.contains(plugin)
    }

    /// Ids of all applied plugins.
    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(String::as_str)
    }

    pub(crate) fn record_plugin(&mut self, plugin: &str) -> bool {
        self.plugins.insert(plugin.to_string())
    }

    /// Declare a dependency under `grouping`, creating the grouping on
    /// first use.
    pub fn add_dependency(&mut self, grouping: &str, dependency: Dependency) {
        match self.groupings.iter_mut().find(|g| g.name == grouping) {
            Some(g) => g.dependencies.push(dependency),
            None => self.groupings.push(DependencyGrouping {
                name: grouping.to_string(),
                dependencies: vec![dependency],
            }),
        }
    }

    /// All dependency groupings in declaration order.
    pub fn groupings(&self) -> &[DependencyGrouping] {
        &self.groupings
    }

    /// Every in-workspace project dependency across all groupings,
    /// de-duplicated, first-seen order. External artifacts are filtered out.
    pub fn project_dependencies(&self) -> Vec<ProjectId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for grouping in &self.groupings {
            for dependency in &grouping.dependencies {
                if let Dependency::Project(id) = dependency
                    && seen.insert(*id)
                {
                    out.push(*id);
                }
            }
        }
        out
    }

    /// The project's task container.
    pub fn tasks(&self) -> &TaskContainer {
        &self.tasks
    }

    /// Mutable access to the task container.
    pub fn tasks_mut(&mut self) -> &mut TaskContainer {
        &mut self.tasks
    }

    /// Whether evaluation has run.
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Queue a callback to run when this project finishes evaluating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyEvaluated`] if evaluation already ran; wiring
    /// must happen exactly once, so late registration is refused rather than
    /// run immediately.
    pub fn after_evaluate(&mut self, callback: EvalCallback) -> Result<()> {
        if self.evaluated {
            return Err(Error::AlreadyEvaluated {
                project: self.name.clone(),
            });
        }
        self.after_evaluate.push(callback);
        Ok(())
    }
}
