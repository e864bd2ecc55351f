//! Table schema types.
//!
//! The wire format matches what warehouse APIs expect for schema fields:
//! an ordered list of `{name, type, mode}` objects with upper-case type and
//! mode tokens, e.g. `{"name": "id", "type": "INTEGER", "mode": "REQUIRED"}`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Primitive column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
  Integer,
  Float,
  String,
  Boolean,
  Timestamp,
}

/// Column nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnMode {
  Required,
  Nullable,
}

/// A single column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
  pub name: String,
  #[serde(rename = "type")]
  pub column_type: ColumnType,
  pub mode: ColumnMode,
}

impl Column {
  /// A REQUIRED column.
  pub fn required(name: impl Into<String>, column_type: ColumnType) -> Self {
    Self {
      name: name.into(),
      column_type,
      mode: ColumnMode::Required,
    }
  }

  /// A NULLABLE column.
  pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
    Self {
      name: name.into(),
      column_type,
      mode: ColumnMode::Nullable,
    }
  }
}

/// An ordered table schema.
///
/// Column names must be unique; [`TableSchema::new`] enforces this, and
/// deserialized schemas are re-checked when the workflow is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
  columns: Vec<Column>,
}

impl TableSchema {
  /// Build a schema, rejecting duplicate column names.
  pub fn new(columns: Vec<Column>) -> Result<Self, WorkflowError> {
    let mut seen = HashSet::new();
    for column in &columns {
      if !seen.insert(column.name.as_str()) {
        return Err(WorkflowError::DuplicateColumn(column.name.clone()));
      }
    }
    Ok(Self { columns })
  }

  /// The columns in declaration order.
  pub fn columns(&self) -> &[Column] {
    &self.columns
  }

  /// Re-run the uniqueness check (used after deserialization).
  pub fn validate(&self) -> Result<(), WorkflowError> {
    let mut seen = HashSet::new();
    for column in &self.columns {
      if !seen.insert(column.name.as_str()) {
        return Err(WorkflowError::DuplicateColumn(column.name.clone()));
      }
    }
    Ok(())
  }
}
