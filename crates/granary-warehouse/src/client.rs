use async_trait::async_trait;

use granary_workflow::TableSchema;

use crate::error::WarehouseError;

/// The warehouse operations step execution is built on.
///
/// Creation calls are idempotent: creating a dataset that already exists, or
/// a table that already exists with an identical schema, succeeds. Retries,
/// backoff, connection handling, and credential resolution are the
/// implementation's concern, not the caller's.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
  /// Create a dataset. Succeeds if it already exists.
  async fn create_dataset(&self, project_id: &str, dataset_id: &str) -> Result<(), WarehouseError>;

  /// Create a table with the given schema. Succeeds if the table already
  /// exists with an identical schema; fails with
  /// [`WarehouseError::SchemaConflict`] otherwise.
  async fn create_table(
    &self,
    project_id: &str,
    dataset_id: &str,
    table_id: &str,
    schema: &TableSchema,
  ) -> Result<(), WarehouseError>;

  /// Whether the table currently exists.
  async fn table_exists(
    &self,
    project_id: &str,
    dataset_id: &str,
    table_id: &str,
  ) -> Result<bool, WarehouseError>;

  /// Run a SQL statement to completion.
  async fn run_sql(&self, sql: &str, legacy_sql: bool) -> Result<(), WarehouseError>;

  /// Run a SQL query expected to return exactly one row with one column.
  async fn run_scalar_query(
    &self,
    sql: &str,
    legacy_sql: bool,
  ) -> Result<serde_json::Value, WarehouseError>;
}
