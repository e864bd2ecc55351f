use serde::{Deserialize, Serialize};

use crate::schema::TableSchema;

fn default_poll_interval_ms() -> u64 {
  5_000
}

fn default_timeout_ms() -> u64 {
  120_000
}

/// The operation a step performs against the warehouse.
///
/// Each variant carries the typed parameters the operation needs; there are
/// no untyped parameter bags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
  /// Create a dataset. Succeeds if the dataset already exists.
  CreateDataset {
    project_id: String,
    dataset_id: String,
  },

  /// Create a table with a schema. Succeeds if the table already exists
  /// with an identical schema.
  CreateTable {
    project_id: String,
    dataset_id: String,
    table_id: String,
    schema: TableSchema,
  },

  /// Poll until the table is observed to exist, bounded by a timeout.
  AwaitExistence {
    project_id: String,
    dataset_id: String,
    table_id: String,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
  },

  /// Run a SQL statement to completion.
  RunStatement {
    sql: String,
    #[serde(default)]
    legacy_sql: bool,
  },

  /// Run a SQL query returning one row and one column, and compare the
  /// result against an expected value.
  CheckScalar {
    sql: String,
    #[serde(default)]
    legacy_sql: bool,
    expected: serde_json::Value,
  },
}

impl Operation {
  /// Short operation name used in logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Operation::CreateDataset { .. } => "create_dataset",
      Operation::CreateTable { .. } => "create_table",
      Operation::AwaitExistence { .. } => "await_existence",
      Operation::RunStatement { .. } => "run_statement",
      Operation::CheckScalar { .. } => "check_scalar",
    }
  }
}

/// One declared step: an id, an operation, and an explicit predecessor list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  pub step_id: String,
  #[serde(flatten)]
  pub operation: Operation,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub depends_on: Vec<String>,
}

impl StepDef {
  /// A step with no predecessors.
  pub fn new(step_id: impl Into<String>, operation: Operation) -> Self {
    Self {
      step_id: step_id.into(),
      operation,
      depends_on: Vec::new(),
    }
  }

  /// Add a predecessor.
  pub fn after(mut self, step_id: impl Into<String>) -> Self {
    self.depends_on.push(step_id.into());
    self
  }
}
