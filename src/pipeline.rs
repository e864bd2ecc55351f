//! The bundled forest-fires pipeline: create a dataset and table, wait for
//! the table to exist, insert four rows, and check the row count.

use granary_workflow::{Column, ColumnType, Operation, StepDef, TableSchema, WorkflowDef};

pub const PROJECT: &str = "testingairflow123";
pub const DATASET: &str = "testing_dataset";
pub const TABLE: &str = "forestfires";

fn forest_fires_schema() -> TableSchema {
  TableSchema::new(vec![
    Column::required("id", ColumnType::Integer),
    Column::nullable("y", ColumnType::Integer),
    Column::nullable("month", ColumnType::String),
    Column::nullable("day", ColumnType::String),
    Column::nullable("ffmc", ColumnType::Float),
    Column::nullable("dmc", ColumnType::Float),
    Column::nullable("dc", ColumnType::Float),
    Column::nullable("isi", ColumnType::Float),
    Column::nullable("temp", ColumnType::Float),
    Column::nullable("rh", ColumnType::Float),
    Column::nullable("wind", ColumnType::Float),
    Column::nullable("rain", ColumnType::Float),
    Column::nullable("area", ColumnType::Float),
  ])
  .expect("forest fires schema has unique column names")
}

/// The five-step chain:
/// create_dataset → create_table → check_for_table → insert_query →
/// check_row_count.
pub fn forest_fires_definition() -> WorkflowDef {
  let insert_sql = format!(
    "INSERT INTO `{PROJECT}.{DATASET}.{TABLE}` VALUES \
     (1,2,'aug','fri',91.0,166.9,752.6,7.1,25.9,41.0,3.6,0.0,0.0), \
     (2,2,'feb','mon',84.0,9.3,34.0,2.1,13.9,40.0,5.4,0.0,0.0), \
     (3,4,'mar','sat',69.0,2.4,15.5,0.7,17.4,24.0,5.4,0.0,0.0), \
     (4,3,'oct','tue',87.0,66.5,278.6,5.8,22.2,34.0,3.6,0.0,0.0)"
  );
  let count_sql = format!("SELECT COUNT(*) FROM `{PROJECT}.{DATASET}.{TABLE}`");

  WorkflowDef {
    workflow_id: "simple_warehouse_run".to_string(),
    name: "Load and check forest fire data".to_string(),
    steps: vec![
      StepDef::new(
        "create_dataset",
        Operation::CreateDataset {
          project_id: PROJECT.to_string(),
          dataset_id: DATASET.to_string(),
        },
      ),
      StepDef::new(
        "create_table",
        Operation::CreateTable {
          project_id: PROJECT.to_string(),
          dataset_id: DATASET.to_string(),
          table_id: TABLE.to_string(),
          schema: forest_fires_schema(),
        },
      )
      .after("create_dataset"),
      StepDef::new(
        "check_for_table",
        Operation::AwaitExistence {
          project_id: PROJECT.to_string(),
          dataset_id: DATASET.to_string(),
          table_id: TABLE.to_string(),
          poll_interval_ms: 1_000,
          timeout_ms: 60_000,
        },
      )
      .after("create_table"),
      StepDef::new(
        "insert_query",
        Operation::RunStatement {
          sql: insert_sql,
          legacy_sql: false,
        },
      )
      .after("check_for_table"),
      StepDef::new(
        "check_row_count",
        Operation::CheckScalar {
          sql: count_sql,
          legacy_sql: false,
          expected: serde_json::json!(4),
        },
      )
      .after("insert_query"),
    ],
  }
}
