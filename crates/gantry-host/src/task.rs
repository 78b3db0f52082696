//! Lazy task registration and the realized task model.
//!
//! Tasks are registered as named deferred builders: [`TaskContainer::register`]
//! records the name, [`TaskContainer::configure`] queues mutations, and
//! nothing runs until the container is realized once the project model is
//! final. Configure actions queued after realization are applied
//! immediately, so late capability listeners still land.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::workspace::ProjectId;

/// A validated task name handle returned by [`TaskContainer::named`].
///
/// Holding one proves the task existed in the container at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskName(String);

impl TaskName {
    /// The task name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to a task, possibly in another project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskRef {
    /// The project owning the referenced task.
    pub project: ProjectId,
    /// The task name within that project.
    pub task: String,
}

impl TaskRef {
    /// Create a reference to `task` in `project`.
    pub fn new(project: ProjectId, task: impl Into<String>) -> Self {
        Self {
            project,
            task: task.into(),
        }
    }
}

/// A realized build task.
///
/// The dependency set only grows: wiring adds prerequisites, nothing
/// removes them.
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    /// Group label shown by the host's task listing; `None` hides the task.
    pub group: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Disabled tasks stay in the graph but the host skips their action.
    pub enabled: bool,
    /// Distinguishing label attached to the task's output artifact.
    pub artifact_classifier: Option<String>,
    depends_on: BTreeSet<TaskRef>,
}

impl Task {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            group: None,
            description: None,
            enabled: true,
            artifact_classifier: None,
            depends_on: BTreeSet::new(),
        }
    }

    /// The task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a prerequisite. Additive; duplicates collapse.
    pub fn add_dependency(&mut self, prerequisite: TaskRef) {
        self.depends_on.insert(prerequisite);
    }

    /// The task's prerequisites, in deterministic order.
    pub fn depends_on(&self) -> impl Iterator<Item = &TaskRef> {
        self.depends_on.iter()
    }

    /// Whether `prerequisite` is in the dependency set.
    pub fn depends_on_task(&self, prerequisite: &TaskRef) -> bool {
        self.depends_on.contains(prerequisite)
    }

    /// Number of prerequisites.
    pub fn dependency_count(&self) -> usize {
        self.depends_on.len()
    }
}

type ConfigureAction = Box<dyn FnOnce(&mut Task)>;

struct TaskEntry {
    task: Task,
    pending: Vec<ConfigureAction>,
    realized: bool,
}

/// Container of lazily-configured tasks for one project.
#[derive(Default)]
pub struct TaskContainer {
    order: Vec<String>,
    entries: HashMap<String, TaskEntry>,
}

impl TaskContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task name. Configuration is deferred to realization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if the name is taken.
    pub fn register(&mut self, name: &str) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(Error::DuplicateTask {
                name: name.to_string(),
            });
        }
        self.order.push(name.to_string());
        self.entries.insert(
            name.to_string(),
            TaskEntry {
                task: Task::new(name),
                pending: Vec::new(),
                realized: false,
            },
        );
        Ok(())
    }

    /// Queue a configuration action for `name`.
    ///
    /// Actions run in queue order at realization; if the task is already
    /// realized the action runs immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if the name was never registered.
    pub fn configure(
        &mut self,
        name: &str,
        action: impl FnOnce(&mut Task) + 'static,
    ) -> Result<()> {
        let entry = self.entries.get_mut(name).ok_or_else(|| Error::UnknownTask {
            name: name.to_string(),
        })?;
        if entry.realized {
            action(&mut entry.task);
        } else {
            entry.pending.push(Box::new(action));
        }
        Ok(())
    }

    /// Look up a task by name, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if the name was never registered.
    pub fn named(&self, name: &str) -> Result<TaskName> {
        if self.entries.contains_key(name) {
            Ok(TaskName(name.to_string()))
        } else {
            Err(Error::UnknownTask {
                name: name.to_string(),
            })
        }
    }

    /// Whether a task with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Current state of a task. Before realization this is the unconfigured
    /// seed.
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.entries.get(name).map(|e| &e.task)
    }

    /// Registered task names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Run every queued configuration action, in registration order across
    /// tasks and queue order within one. Idempotent: already-realized tasks
    /// have no queued actions left.
    pub(crate) fn realize_all(&mut self) {
        for name in &self.order {
            let entry = self
                .entries
                .get_mut(name)
                .expect("registration order and entry map are kept in sync");
            for action in entry.pending.drain(..) {
                action(&mut entry.task);
            }
            entry.realized = true;
        }
    }

    /// Realized tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().map(|name| {
            &self
                .entries
                .get(name)
                .expect("registration order and entry map are kept in sync")
                .task
        })
    }
}
