//! Execution errors.

use granary_warehouse::WarehouseError;
use thiserror::Error;

/// Why a single step failed. Recorded on the run result.
#[derive(Debug, Error)]
pub enum StepError {
  /// The underlying warehouse call failed.
  #[error("warehouse operation failed: {0}")]
  Operation(#[from] WarehouseError),

  /// The awaited table never appeared within the configured timeout.
  #[error("table '{table}' did not appear within {timeout_ms}ms")]
  Timeout { table: String, timeout_ms: u64 },

  /// The scalar check observed a value other than the expected one.
  #[error("value check failed: expected {expected}, observed {observed}")]
  ValueCheck {
    expected: serde_json::Value,
    observed: serde_json::Value,
  },
}

/// Run-level errors.
///
/// Step failures are not errors at this level; they end up on the
/// [`crate::RunResult`] so the caller still sees which steps were skipped.
#[derive(Debug, Error)]
pub enum ExecutionError {
  /// The run was cancelled before completing.
  #[error("run cancelled")]
  Cancelled,
}
