//! Workflow executor implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use granary_warehouse::WarehouseClient;
use granary_workflow::{Operation, StepDef, Workflow};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::{ExecutionError, StepError};
use crate::run::{RunResult, RunStatus, StepFailure, StepState, StepStatus};

/// Executes workflows against a warehouse client.
///
/// Execution is single-pass and dependency-ordered: a step becomes eligible
/// only when every declared predecessor has succeeded, and eligible steps run
/// one at a time in declaration order. Already-succeeded steps are never
/// rolled back on failure or cancellation.
pub struct WorkflowExecutor<C: WarehouseClient> {
  client: Arc<C>,
}

impl<C: WarehouseClient> WorkflowExecutor<C> {
  /// Create a new executor over the given warehouse client.
  pub fn new(client: Arc<C>) -> Self {
    Self { client }
  }

  /// Execute a workflow once.
  ///
  /// Returns `Ok` with a [`RunResult`] whether or not every step succeeded;
  /// a step failure marks its transitive dependents [`StepStatus::Skipped`]
  /// and ends the run with [`RunStatus::Failed`]. Only cancellation aborts
  /// the run without a result.
  #[instrument(
    name = "workflow_execute",
    skip(self, workflow, cancel),
    fields(workflow_id = %workflow.workflow_id())
  )]
  pub async fn execute(
    &self,
    workflow: &Workflow,
    cancel: CancellationToken,
  ) -> Result<RunResult, ExecutionError> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();

    info!(run_id = %run_id, name = %workflow.name(), "workflow_started");

    let graph = workflow.graph();
    let mut states: Vec<StepState> = workflow
      .steps()
      .iter()
      .map(|s| StepState::pending(&s.step_id))
      .collect();
    let index: HashMap<&str, usize> = workflow
      .steps()
      .iter()
      .enumerate()
      .map(|(i, s)| (s.step_id.as_str(), i))
      .collect();
    let mut failure: Option<StepFailure> = None;

    while let Some(step) = next_ready(workflow, &index, &states) {
      if cancel.is_cancelled() {
        warn!(run_id = %run_id, "workflow cancelled");
        return Err(ExecutionError::Cancelled);
      }

      let slot = index[step.step_id.as_str()];
      states[slot].status = StepStatus::Running;
      states[slot].started_at = Some(Utc::now());

      info!(
        run_id = %run_id,
        step_id = %step.step_id,
        operation = %step.operation.kind(),
        "step_started"
      );

      let outcome = tokio::select! {
        outcome = self.execute_step(step) => outcome,
        _ = cancel.cancelled() => {
          warn!(run_id = %run_id, step_id = %step.step_id, "workflow cancelled during step");
          return Err(ExecutionError::Cancelled);
        }
      };

      states[slot].completed_at = Some(Utc::now());

      match outcome {
        Ok(()) => {
          states[slot].status = StepStatus::Succeeded;
          info!(run_id = %run_id, step_id = %step.step_id, "step_succeeded");
        }
        Err(step_error) => {
          states[slot].status = StepStatus::Failed;
          states[slot].error = Some(step_error.to_string());
          error!(
            run_id = %run_id,
            step_id = %step.step_id,
            error = %step_error,
            "step_failed"
          );

          for dependent in graph.descendants(&step.step_id) {
            let dependent_slot = index[dependent.as_str()];
            states[dependent_slot].status = StepStatus::Skipped;
          }

          failure = Some(StepFailure {
            step_id: step.step_id.clone(),
            error: step_error,
          });
          break;
        }
      }
    }

    let status = if states.iter().all(|s| s.status == StepStatus::Succeeded) {
      RunStatus::Succeeded
    } else {
      RunStatus::Failed
    };

    match status {
      RunStatus::Succeeded => info!(run_id = %run_id, "workflow_completed"),
      RunStatus::Failed => error!(run_id = %run_id, "workflow_failed"),
    }

    Ok(RunResult {
      run_id,
      workflow_id: workflow.workflow_id().to_string(),
      status,
      steps: states,
      started_at,
      completed_at: Utc::now(),
      failure,
    })
  }

  /// Execute one step's operation against the warehouse.
  async fn execute_step(&self, step: &StepDef) -> Result<(), StepError> {
    match &step.operation {
      Operation::CreateDataset {
        project_id,
        dataset_id,
      } => {
        self.client.create_dataset(project_id, dataset_id).await?;
        Ok(())
      }
      Operation::CreateTable {
        project_id,
        dataset_id,
        table_id,
        schema,
      } => {
        self
          .client
          .create_table(project_id, dataset_id, table_id, schema)
          .await?;
        Ok(())
      }
      Operation::AwaitExistence {
        project_id,
        dataset_id,
        table_id,
        poll_interval_ms,
        timeout_ms,
      } => {
        self
          .await_existence(
            project_id,
            dataset_id,
            table_id,
            *poll_interval_ms,
            *timeout_ms,
          )
          .await
      }
      Operation::RunStatement { sql, legacy_sql } => {
        self.client.run_sql(sql, *legacy_sql).await?;
        Ok(())
      }
      Operation::CheckScalar {
        sql,
        legacy_sql,
        expected,
      } => {
        let observed = self.client.run_scalar_query(sql, *legacy_sql).await?;
        if scalar_matches(expected, &observed) {
          Ok(())
        } else {
          Err(StepError::ValueCheck {
            expected: expected.clone(),
            observed,
          })
        }
      }
    }
  }

  /// Poll for table existence, bounded by the timeout.
  ///
  /// The first check happens before any sleep, so a table that already
  /// exists succeeds immediately.
  async fn await_existence(
    &self,
    project_id: &str,
    dataset_id: &str,
    table_id: &str,
    poll_interval_ms: u64,
    timeout_ms: u64,
  ) -> Result<(), StepError> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(poll_interval_ms);

    loop {
      if self
        .client
        .table_exists(project_id, dataset_id, table_id)
        .await?
      {
        return Ok(());
      }

      let now = Instant::now();
      if now >= deadline {
        return Err(StepError::Timeout {
          table: format!("{}.{}.{}", project_id, dataset_id, table_id),
          timeout_ms,
        });
      }

      // Never sleep past the deadline.
      tokio::time::sleep_until(deadline.min(now + poll_interval)).await;
    }
  }
}

/// First pending step, in declaration order, whose predecessors have all
/// succeeded.
fn next_ready<'a>(
  workflow: &'a Workflow,
  index: &HashMap<&str, usize>,
  states: &[StepState],
) -> Option<&'a StepDef> {
  workflow
    .steps()
    .iter()
    .filter(|s| states[index[s.step_id.as_str()]].status == StepStatus::Pending)
    .find(|s| {
      s.depends_on
        .iter()
        .all(|up| states[index[up.as_str()]].status == StepStatus::Succeeded)
    })
}

/// Compare the expected and observed scalar values.
///
/// Numbers compare numerically so an expected integer 4 matches an observed
/// 4.0; everything else compares as plain JSON equality.
fn scalar_matches(expected: &serde_json::Value, observed: &serde_json::Value) -> bool {
  match (expected.as_f64(), observed.as_f64()) {
    (Some(e), Some(o)) => e == o,
    _ => expected == observed,
  }
}
