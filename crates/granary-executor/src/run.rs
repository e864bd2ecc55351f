//! Run state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StepError;

/// Status of a single step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Pending,
  Running,
  Succeeded,
  Failed,
  Skipped,
}

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  Succeeded,
  Failed,
}

/// One step's lifecycle within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState {
  pub step_id: String,
  pub status: StepStatus,
  pub started_at: Option<DateTime<Utc>>,
  pub completed_at: Option<DateTime<Utc>>,
  pub error: Option<String>,
}

impl StepState {
  pub(crate) fn pending(step_id: &str) -> Self {
    Self {
      step_id: step_id.to_string(),
      status: StepStatus::Pending,
      started_at: None,
      completed_at: None,
      error: None,
    }
  }
}

/// The first failing step of a run, with its typed error.
#[derive(Debug)]
pub struct StepFailure {
  pub step_id: String,
  pub error: StepError,
}

/// Result of one workflow run.
///
/// `steps` is in declaration order and always covers every declared step,
/// including the ones that were skipped after a failure.
#[derive(Debug)]
pub struct RunResult {
  pub run_id: String,
  pub workflow_id: String,
  pub status: RunStatus,
  pub steps: Vec<StepState>,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
  pub failure: Option<StepFailure>,
}

impl RunResult {
  /// Look up a step's state by id.
  pub fn step(&self, step_id: &str) -> Option<&StepState> {
    self.steps.iter().find(|s| s.step_id == step_id)
  }

  pub fn succeeded(&self) -> bool {
    self.status == RunStatus::Succeeded
  }
}
