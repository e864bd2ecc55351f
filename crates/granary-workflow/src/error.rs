use thiserror::Error;

/// Errors raised while building a workflow from its definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
  /// The definition declares no steps at all.
  #[error("workflow has no steps")]
  Empty,

  /// Two steps share the same id.
  #[error("duplicate step id: {0}")]
  DuplicateStepId(String),

  /// A dependency edge names a step that was never declared.
  #[error("step '{step_id}' depends on unknown step '{reference}'")]
  UnknownStepReference { step_id: String, reference: String },

  /// The dependency edges close a cycle.
  #[error("dependency cycle detected through step '{0}'")]
  CycleDetected(String),

  /// A table schema declares the same column name twice.
  #[error("duplicate column '{0}' in table schema")]
  DuplicateColumn(String),
}
