//! Task dependency analysis.
//!
//! This module provides:
//! - An index-based adjacency structure over task ids
//! - Cycle detection (iterative three-color DFS)
//! - Deterministic topological ordering (Kahn, ties by declaration order)

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::planner::error::{PlanError, PlanResult};
use crate::planner::types::Task;

/// Dependency graph over tasks, addressed by declaration index
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    ids: Vec<String>,
    /// `deps[i]` lists the tasks `i` waits for
    deps: Vec<Vec<usize>>,
    /// `dependents[i]` lists the tasks waiting for `i`
    dependents: Vec<Vec<usize>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

impl DependencyGraph {
    /// Build the graph, failing with a reference error on duplicate or unknown ids
    pub fn build(tasks: &[Task]) -> PlanResult<Self> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.id.as_str(), i).is_some() {
                return Err(PlanError::reference(format!("duplicate task id '{}'", task.id)));
            }
        }

        let mut deps = vec![Vec::new(); tasks.len()];
        let mut dependents = vec![Vec::new(); tasks.len()];
        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.dependencies {
                let &j = index.get(dep.as_str()).ok_or_else(|| {
                    PlanError::reference(format!(
                        "task '{}' depends on unknown task '{}'",
                        task.id, dep
                    ))
                })?;
                if !deps[i].contains(&j) {
                    deps[i].push(j);
                    dependents[j].push(i);
                }
            }
        }

        Ok(Self {
            ids: tasks.iter().map(|t| t.id.clone()).collect(),
            deps,
            dependents,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    pub fn dependencies_of(&self, idx: usize) -> &[usize] {
        &self.deps[idx]
    }

    /// Return one cycle as a closed id path (first id repeated at the end)
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut color = vec![Color::Unvisited; self.len()];

        for root in 0..self.len() {
            if color[root] != Color::Unvisited {
                continue;
            }

            // (node, next dependency to visit)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            color[root] = Color::InProgress;

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                if let Some(&next) = self.deps[node].get(top.1) {
                    top.1 += 1;
                    match color[next] {
                        Color::Unvisited => {
                            color[next] = Color::InProgress;
                            stack.push((next, 0));
                        }
                        Color::InProgress => {
                            let start = stack
                                .iter()
                                .position(|&(n, _)| n == next)
                                .unwrap_or(0);
                            let mut cycle: Vec<String> = stack[start..]
                                .iter()
                                .map(|&(n, _)| self.ids[n].clone())
                                .collect();
                            cycle.push(self.ids[next].clone());
                            return Some(cycle);
                        }
                        Color::Done => {}
                    }
                } else {
                    color[node] = Color::Done;
                    stack.pop();
                }
            }
        }

        None
    }

    pub fn ensure_acyclic(&self) -> PlanResult<()> {
        match self.find_cycle() {
            Some(cycle) => Err(PlanError::Cycle { cycle }),
            None => Ok(()),
        }
    }

    /// Topological order of task indices; ties go to the earlier-declared task
    pub fn topological_order(&self) -> PlanResult<Vec<usize>> {
        let mut remaining: Vec<usize> = self.deps.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = remaining
            .iter()
            .enumerate()
            .filter(|(_, &n)| n == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &dependent in &self.dependents[node] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() != self.len() {
            return Err(PlanError::scheduling(format!(
                "no valid topological order: {} of {} tasks are blocked by a dependency cycle",
                self.len() - order.len(),
                self.len()
            )));
        }

        Ok(order)
    }
}
