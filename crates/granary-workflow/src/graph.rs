use std::collections::{HashMap, HashSet, VecDeque};

use crate::step::StepDef;

/// Dependency graph over step ids, for traversal and analysis.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Adjacency list: step_id -> steps that depend on it.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: step_id -> its declared predecessors.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Steps with no predecessors.
  entry_points: Vec<String>,
}

impl Graph {
  /// Build the graph from validated step declarations.
  ///
  /// Assumes ids are unique and every `depends_on` entry names a declared
  /// step; [`crate::WorkflowDef::build`] checks both before calling this.
  pub fn new(steps: &[StepDef]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    for step in steps {
      adjacency.entry(step.step_id.clone()).or_default();
      reverse_adjacency.entry(step.step_id.clone()).or_default();
    }

    for step in steps {
      for predecessor in &step.depends_on {
        adjacency
          .entry(predecessor.clone())
          .or_default()
          .push(step.step_id.clone());
        reverse_adjacency
          .entry(step.step_id.clone())
          .or_default()
          .push(predecessor.clone());
      }
    }

    // Entry points in declaration order, so execution order is stable.
    let entry_points: Vec<String> = steps
      .iter()
      .filter(|s| s.depends_on.is_empty())
      .map(|s| s.step_id.clone())
      .collect();

    Self {
      adjacency,
      reverse_adjacency,
      entry_points,
    }
  }

  /// Steps with no predecessors, in declaration order.
  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }

  /// Steps that directly depend on the given step.
  pub fn downstream(&self, step_id: &str) -> &[String] {
    self
      .adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Declared predecessors of the given step.
  pub fn upstream(&self, step_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Every step transitively downstream of the given step.
  ///
  /// Used to mark dependents as skipped once a step fails.
  pub fn descendants(&self, step_id: &str) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut queue: VecDeque<&str> = self.downstream(step_id).iter().map(String::as_str).collect();

    while let Some(id) = queue.pop_front() {
      if seen.insert(id.to_string()) {
        queue.extend(self.downstream(id).iter().map(String::as_str));
      }
    }

    seen
  }
}
