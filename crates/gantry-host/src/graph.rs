//! Task graph materialization and topological ordering.
//!
//! After every project has been evaluated, the workspace can be flattened
//! into a single execution plan. Materialization realizes each project's
//! task container (running any deferred configuration) and orders all tasks
//! so that a task's dependencies always come first.
//!
//! Edges point from dependent to dependency: if `war` depends on `classes`,
//! the plan lists `classes` before `war`.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::task::TaskRef;
use crate::workspace::Workspace;

/// A materialized, dependency-first execution plan over every task in the
/// workspace.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    order: Vec<TaskRef>,
}

impl TaskGraph {
    /// Tasks in dependency-first order.
    pub fn order(&self) -> &[TaskRef] {
        &self.order
    }

    /// Position of a task in the plan, if present.
    pub fn position(&self, task: &TaskRef) -> Option<usize> {
        self.order.iter().position(|t| t == task)
    }

    /// Number of tasks in the plan.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate tasks in plan order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskRef> {
        self.order.iter()
    }
}

impl Workspace {
    /// Qualified `project:task` form of a task reference, for messages.
    pub fn qualified_name(&self, task: &TaskRef) -> String {
        format!("{}:{}", self.project(task.project).name(), task.task)
    }

    /// Materialize the full task graph.
    ///
    /// Realizes every project's task container, validates that each declared
    /// dependency resolves to a registered task, and returns tasks in
    /// dependency-first order (Kahn's algorithm). Ties break on project
    /// creation order, then task name, so the plan is deterministic.
    ///
    /// # Errors
    ///
    /// - [`Error::NotEvaluated`] if any project has not been evaluated.
    /// - [`Error::MissingDependency`] if a task depends on a task that was
    ///   never registered.
    /// - [`Error::DependencyCycle`] if the dependency relation has a cycle.
    pub fn task_graph(&mut self) -> Result<TaskGraph> {
        for id in self.project_ids().collect::<Vec<_>>() {
            if !self.project(id).is_evaluated() {
                return Err(Error::NotEvaluated {
                    project: self.project(id).name().to_string(),
                });
            }
            self.project_mut(id).tasks_mut().realize_all();
        }

        // Collect every task as a node.
        let mut nodes: Vec<TaskRef> = Vec::new();
        for id in self.project_ids() {
            for task in self.project(id).tasks().tasks() {
                nodes.push(TaskRef::new(id, task.name()));
            }
        }
        let node_set: HashSet<&TaskRef> = nodes.iter().collect();

        // In-degree counts dependencies; dependents maps a dependency to the
        // tasks waiting on it.
        let mut in_degree: HashMap<&TaskRef, usize> = nodes.iter().map(|n| (n, 0)).collect();
        let mut dependents: HashMap<&TaskRef, Vec<&TaskRef>> = HashMap::new();
        for node in &nodes {
            let task = self
                .project(node.project)
                .tasks()
                .get(&node.task)
                .ok_or_else(|| Error::UnknownTask {
                    name: node.task.clone(),
                })?;
            for dependency in task.depends_on() {
                if !node_set.contains(dependency) {
                    return Err(Error::MissingDependency {
                        task: self.qualified_name(node),
                        dependency: self.qualified_name(dependency),
                    });
                }
                *in_degree.entry(node).or_insert(0) += 1;
                dependents.entry(dependency).or_default().push(node);
            }
        }

        // Seed with zero-in-degree nodes, kept sorted so ready tasks leave
        // the queue in a stable order.
        let mut ready: Vec<&TaskRef> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(&node, _)| node)
            .collect();
        ready.sort_by(|a, b| b.cmp(a));

        let mut order = Vec::with_capacity(nodes.len());
        while let Some(current) = ready.pop() {
            order.push(current.clone());
            if let Some(waiting) = dependents.get(current) {
                for &dependent in waiting {
                    if let Some(deg) = in_degree.get_mut(dependent) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            ready.push(dependent);
                            ready.sort_by(|a, b| b.cmp(a));
                        }
                    }
                }
            }
        }

        if order.len() != nodes.len() {
            let placed: HashSet<&TaskRef> = order.iter().collect();
            let mut participants: Vec<String> = nodes
                .iter()
                .filter(|n| !placed.contains(n))
                .map(|n| self.qualified_name(n))
                .collect();
            participants.sort();
            return Err(Error::DependencyCycle { participants });
        }

        Ok(TaskGraph { order })
    }
}
