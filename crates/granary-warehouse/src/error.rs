use thiserror::Error;

/// Errors surfaced by a warehouse client.
#[derive(Debug, Error)]
pub enum WarehouseError {
  /// A dataset or table identifier the warehouse rejects.
  #[error("invalid identifier: '{0}'")]
  InvalidIdentifier(String),

  /// The caller is not allowed to perform the operation.
  #[error("permission denied: {0}")]
  PermissionDenied(String),

  /// A statement referenced a dataset that does not exist.
  #[error("dataset not found: {0}")]
  DatasetNotFound(String),

  /// A statement referenced a table that does not exist.
  #[error("table not found: {0}")]
  TableNotFound(String),

  /// The table already exists with a different schema.
  #[error("table '{0}' already exists with a conflicting schema")]
  SchemaConflict(String),

  /// The statement failed to parse or execute.
  #[error("query failed: {0}")]
  Query(String),

  /// A scalar query returned something other than one row and one column.
  #[error("query did not return a single scalar: {0}")]
  NotScalar(String),
}
