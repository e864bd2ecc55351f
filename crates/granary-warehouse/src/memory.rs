//! In-memory warehouse.
//!
//! Backs the CLI demo and the integration tests so a run never needs a real
//! warehouse. Statement handling is deliberately narrow: only the two shapes
//! the load-and-check pipeline issues are recognized (`INSERT INTO ... VALUES
//! (...), (...)` and `SELECT COUNT(*) FROM ...`), by string scanning rather
//! than a SQL engine. Anything else fails with [`WarehouseError::Query`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use granary_workflow::TableSchema;

use crate::client::WarehouseClient;
use crate::error::WarehouseError;

#[derive(Debug, Default)]
struct Dataset {
  tables: HashMap<String, Table>,
}

#[derive(Debug)]
struct Table {
  schema: TableSchema,
  rows: u64,
}

/// An in-process [`WarehouseClient`].
#[derive(Debug, Default)]
pub struct MemoryWarehouse {
  // Keyed by "project.dataset".
  datasets: Mutex<HashMap<String, Dataset>>,
}

impl MemoryWarehouse {
  pub fn new() -> Self {
    Self::default()
  }

  /// Row count of a table, if it exists. Test/inspection helper.
  pub fn row_count(&self, project_id: &str, dataset_id: &str, table_id: &str) -> Option<u64> {
    let datasets = self.datasets.lock().unwrap();
    datasets
      .get(&dataset_key(project_id, dataset_id))
      .and_then(|d| d.tables.get(table_id))
      .map(|t| t.rows)
  }

  /// Whether a dataset exists. Test/inspection helper.
  pub fn dataset_exists(&self, project_id: &str, dataset_id: &str) -> bool {
    let datasets = self.datasets.lock().unwrap();
    datasets.contains_key(&dataset_key(project_id, dataset_id))
  }
}

fn dataset_key(project_id: &str, dataset_id: &str) -> String {
  format!("{}.{}", project_id, dataset_id)
}

fn validate_identifier(id: &str) -> Result<(), WarehouseError> {
  if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
    return Err(WarehouseError::InvalidIdentifier(id.to_string()));
  }
  Ok(())
}

fn reject_legacy(legacy_sql: bool) -> Result<(), WarehouseError> {
  if legacy_sql {
    return Err(WarehouseError::Query(
      "legacy SQL dialect is not supported".to_string(),
    ));
  }
  Ok(())
}

/// Extract the backtick-quoted `project.dataset.table` reference.
fn parse_table_ref(sql: &str) -> Option<(String, String, String)> {
  let start = sql.find('`')?;
  let rest = &sql[start + 1..];
  let end = rest.find('`')?;
  let mut parts = rest[..end].split('.');
  let project = parts.next()?.to_string();
  let dataset = parts.next()?.to_string();
  let table = parts.next()?.to_string();
  if parts.next().is_some() {
    return None;
  }
  Some((project, dataset, table))
}

/// Count top-level parenthesized tuples, ignoring parens inside string
/// literals.
fn count_value_tuples(values: &str) -> u64 {
  let mut tuples = 0u64;
  let mut depth = 0u32;
  let mut in_string = false;

  for c in values.chars() {
    match c {
      '\'' => in_string = !in_string,
      '(' if !in_string => {
        if depth == 0 {
          tuples += 1;
        }
        depth += 1;
      }
      ')' if !in_string => depth = depth.saturating_sub(1),
      _ => {}
    }
  }

  tuples
}

#[async_trait]
impl WarehouseClient for MemoryWarehouse {
  async fn create_dataset(&self, project_id: &str, dataset_id: &str) -> Result<(), WarehouseError> {
    validate_identifier(project_id)?;
    validate_identifier(dataset_id)?;

    let mut datasets = self.datasets.lock().unwrap();
    datasets
      .entry(dataset_key(project_id, dataset_id))
      .or_default();
    Ok(())
  }

  async fn create_table(
    &self,
    project_id: &str,
    dataset_id: &str,
    table_id: &str,
    schema: &TableSchema,
  ) -> Result<(), WarehouseError> {
    validate_identifier(table_id)?;

    let mut datasets = self.datasets.lock().unwrap();
    let dataset = datasets
      .get_mut(&dataset_key(project_id, dataset_id))
      .ok_or_else(|| WarehouseError::DatasetNotFound(dataset_key(project_id, dataset_id)))?;

    match dataset.tables.get(table_id) {
      Some(existing) if existing.schema == *schema => Ok(()),
      Some(_) => Err(WarehouseError::SchemaConflict(table_id.to_string())),
      None => {
        dataset.tables.insert(
          table_id.to_string(),
          Table {
            schema: schema.clone(),
            rows: 0,
          },
        );
        Ok(())
      }
    }
  }

  async fn table_exists(
    &self,
    project_id: &str,
    dataset_id: &str,
    table_id: &str,
  ) -> Result<bool, WarehouseError> {
    let datasets = self.datasets.lock().unwrap();
    Ok(
      datasets
        .get(&dataset_key(project_id, dataset_id))
        .is_some_and(|d| d.tables.contains_key(table_id)),
    )
  }

  async fn run_sql(&self, sql: &str, legacy_sql: bool) -> Result<(), WarehouseError> {
    reject_legacy(legacy_sql)?;

    let trimmed = sql.trim();
    let is_insert = trimmed
      .get(..11)
      .is_some_and(|prefix| prefix.eq_ignore_ascii_case("insert into"));
    if !is_insert {
      return Err(WarehouseError::Query(format!(
        "unsupported statement: {}",
        trimmed.split_whitespace().next().unwrap_or("")
      )));
    }

    let (project, dataset, table) = parse_table_ref(trimmed)
      .ok_or_else(|| WarehouseError::Query("missing `project.dataset.table` target".to_string()))?;

    let values_at = trimmed
      .to_ascii_lowercase()
      .find("values")
      .ok_or_else(|| WarehouseError::Query("missing VALUES clause".to_string()))?;
    let tuples = count_value_tuples(&trimmed[values_at..]);
    if tuples == 0 {
      return Err(WarehouseError::Query("VALUES clause has no rows".to_string()));
    }

    let mut datasets = self.datasets.lock().unwrap();
    let stored = datasets
      .get_mut(&dataset_key(&project, &dataset))
      .and_then(|d| d.tables.get_mut(&table))
      .ok_or_else(|| WarehouseError::TableNotFound(format!("{}.{}.{}", project, dataset, table)))?;

    stored.rows += tuples;
    Ok(())
  }

  async fn run_scalar_query(
    &self,
    sql: &str,
    legacy_sql: bool,
  ) -> Result<serde_json::Value, WarehouseError> {
    reject_legacy(legacy_sql)?;

    let trimmed = sql.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if !lowered.starts_with("select count(*)") || !lowered.contains("from") {
      return Err(WarehouseError::Query(format!(
        "unsupported scalar query: {}",
        trimmed.split_whitespace().next().unwrap_or("")
      )));
    }

    let (project, dataset, table) = parse_table_ref(trimmed)
      .ok_or_else(|| WarehouseError::Query("missing `project.dataset.table` target".to_string()))?;

    let datasets = self.datasets.lock().unwrap();
    let stored = datasets
      .get(&dataset_key(&project, &dataset))
      .and_then(|d| d.tables.get(&table))
      .ok_or_else(|| WarehouseError::TableNotFound(format!("{}.{}.{}", project, dataset, table)))?;

    Ok(serde_json::Value::from(stored.rows))
  }
}
