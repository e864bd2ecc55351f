use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::graph::Graph;
use crate::step::{Operation, StepDef};

/// The serializable workflow definition, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  pub workflow_id: String,
  pub name: String,
  pub steps: Vec<StepDef>,
}

impl WorkflowDef {
  /// Validate the definition and produce an executable [`Workflow`].
  ///
  /// This checks:
  /// 1. the step list is non-empty
  /// 2. step ids are unique
  /// 3. every `depends_on` entry names a declared step
  /// 4. the dependency edges are acyclic
  /// 5. table schemas have unique column names
  pub fn build(self) -> Result<Workflow, WorkflowError> {
    if self.steps.is_empty() {
      return Err(WorkflowError::Empty);
    }

    let mut step_ids = HashSet::new();
    for step in &self.steps {
      if !step_ids.insert(step.step_id.as_str()) {
        return Err(WorkflowError::DuplicateStepId(step.step_id.clone()));
      }
    }

    for step in &self.steps {
      for reference in &step.depends_on {
        if !step_ids.contains(reference.as_str()) {
          return Err(WorkflowError::UnknownStepReference {
            step_id: step.step_id.clone(),
            reference: reference.clone(),
          });
        }
      }
      if let Operation::CreateTable { schema, .. } = &step.operation {
        schema.validate()?;
      }
    }

    detect_cycle(&self.steps)?;

    Ok(Workflow {
      workflow_id: self.workflow_id,
      name: self.name,
      steps: self.steps,
    })
  }
}

/// Check for cycles using DFS coloring.
fn detect_cycle(steps: &[StepDef]) -> Result<(), WorkflowError> {
  // Edges run predecessor -> dependent.
  let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
  for step in steps {
    adjacency.entry(step.step_id.as_str()).or_default();
  }
  for step in steps {
    for predecessor in &step.depends_on {
      if let Some(neighbors) = adjacency.get_mut(predecessor.as_str()) {
        neighbors.push(step.step_id.as_str());
      }
    }
  }

  // 0 = unvisited, 1 = in progress, 2 = done
  let mut color: HashMap<&str, u8> = steps.iter().map(|s| (s.step_id.as_str(), 0u8)).collect();

  fn dfs<'a>(
    node: &'a str,
    adjacency: &HashMap<&str, Vec<&'a str>>,
    color: &mut HashMap<&'a str, u8>,
  ) -> Option<&'a str> {
    color.insert(node, 1);

    if let Some(neighbors) = adjacency.get(node) {
      for &neighbor in neighbors {
        match color.get(neighbor) {
          Some(1) => return Some(neighbor), // back edge
          Some(0) => {
            if let Some(found) = dfs(neighbor, adjacency, color) {
              return Some(found);
            }
          }
          _ => {}
        }
      }
    }

    color.insert(node, 2);
    None
  }

  for step in steps {
    if color.get(step.step_id.as_str()) == Some(&0) {
      if let Some(offender) = dfs(step.step_id.as_str(), &adjacency, &mut color) {
        return Err(WorkflowError::CycleDetected(offender.to_string()));
      }
    }
  }

  Ok(())
}

/// A validated workflow, ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  workflow_id: String,
  name: String,
  steps: Vec<StepDef>,
}

impl Workflow {
  pub fn workflow_id(&self) -> &str {
    &self.workflow_id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The steps in declaration order.
  pub fn steps(&self) -> &[StepDef] {
    &self.steps
  }

  /// Look up a step by id.
  pub fn get_step(&self, step_id: &str) -> Option<&StepDef> {
    self.steps.iter().find(|s| s.step_id == step_id)
  }

  /// Build the dependency graph for traversal.
  pub fn graph(&self) -> Graph {
    Graph::new(&self.steps)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::{Column, ColumnType, TableSchema};

  fn statement_step(id: &str) -> StepDef {
    StepDef::new(
      id,
      Operation::RunStatement {
        sql: format!("SELECT {}", id),
        legacy_sql: false,
      },
    )
  }

  fn def(steps: Vec<StepDef>) -> WorkflowDef {
    WorkflowDef {
      workflow_id: "wf-1".to_string(),
      name: "test".to_string(),
      steps,
    }
  }

  #[test]
  fn builds_linear_chain() {
    let workflow = def(vec![
      statement_step("a"),
      statement_step("b").after("a"),
      statement_step("c").after("b"),
    ])
    .build()
    .unwrap();

    let graph = workflow.graph();
    assert_eq!(graph.entry_points(), &["a".to_string()]);
    assert_eq!(graph.downstream("a"), &["b".to_string()]);
    assert_eq!(graph.upstream("c"), &["b".to_string()]);

    let descendants = graph.descendants("a");
    assert!(descendants.contains("b"));
    assert!(descendants.contains("c"));
    assert_eq!(descendants.len(), 2);
  }

  #[test]
  fn builds_with_forward_references_only() {
    // Declaration order and dependency order need not match.
    let workflow = def(vec![statement_step("b").after("a"), statement_step("a")])
      .build()
      .unwrap();
    assert_eq!(workflow.graph().entry_points(), &["a".to_string()]);
  }

  #[test]
  fn rejects_empty_definition() {
    assert_eq!(def(vec![]).build(), Err(WorkflowError::Empty));
  }

  #[test]
  fn rejects_duplicate_step_ids() {
    let result = def(vec![statement_step("a"), statement_step("a")]).build();
    assert_eq!(result, Err(WorkflowError::DuplicateStepId("a".to_string())));
  }

  #[test]
  fn rejects_unknown_step_reference() {
    let result = def(vec![statement_step("a").after("missing")]).build();
    assert_eq!(
      result,
      Err(WorkflowError::UnknownStepReference {
        step_id: "a".to_string(),
        reference: "missing".to_string(),
      })
    );
  }

  #[test]
  fn rejects_cycle() {
    let result = def(vec![
      statement_step("a").after("b"),
      statement_step("b").after("a"),
    ])
    .build();
    assert!(matches!(result, Err(WorkflowError::CycleDetected(_))));
  }

  #[test]
  fn rejects_self_dependency() {
    let result = def(vec![statement_step("a").after("a")]).build();
    assert!(matches!(result, Err(WorkflowError::CycleDetected(_))));
  }

  #[test]
  fn rejects_duplicate_schema_column_at_build_time() {
    // Duplicate columns can arrive through deserialized definitions, so the
    // builder re-checks them.
    let schema: TableSchema = serde_json::from_value(serde_json::json!([
      {"name": "id", "type": "INTEGER", "mode": "REQUIRED"},
      {"name": "id", "type": "FLOAT", "mode": "NULLABLE"},
    ]))
    .unwrap();

    let result = def(vec![StepDef::new(
      "create_table",
      Operation::CreateTable {
        project_id: "p".to_string(),
        dataset_id: "d".to_string(),
        table_id: "t".to_string(),
        schema,
      },
    )])
    .build();

    assert_eq!(result, Err(WorkflowError::DuplicateColumn("id".to_string())));
  }

  #[test]
  fn definition_round_trips_through_json() {
    let schema = TableSchema::new(vec![
      Column::required("id", ColumnType::Integer),
      Column::nullable("area", ColumnType::Float),
    ])
    .unwrap();

    let original = def(vec![
      StepDef::new(
        "create_dataset",
        Operation::CreateDataset {
          project_id: "proj".to_string(),
          dataset_id: "ds".to_string(),
        },
      ),
      StepDef::new(
        "create_table",
        Operation::CreateTable {
          project_id: "proj".to_string(),
          dataset_id: "ds".to_string(),
          table_id: "t".to_string(),
          schema,
        },
      )
      .after("create_dataset"),
    ]);

    let json = serde_json::to_string(&original).unwrap();
    let back: WorkflowDef = serde_json::from_str(&json).unwrap();
    assert_eq!(back, original);
  }

  #[test]
  fn await_existence_defaults_apply_when_omitted() {
    let step: StepDef = serde_json::from_value(serde_json::json!({
      "step_id": "check_for_table",
      "operation": "await_existence",
      "project_id": "proj",
      "dataset_id": "ds",
      "table_id": "t",
    }))
    .unwrap();

    match step.operation {
      Operation::AwaitExistence {
        poll_interval_ms,
        timeout_ms,
        ..
      } => {
        assert_eq!(poll_interval_ms, 5_000);
        assert_eq!(timeout_ms, 120_000);
      }
      other => panic!("expected await_existence, got {:?}", other),
    }
  }
}
