//! Granary Executor
//!
//! Executes a validated [`granary_workflow::Workflow`] against a
//! [`granary_warehouse::WarehouseClient`]: steps run one at a time in
//! dependency order, a step runs only after all of its predecessors have
//! succeeded, and everything transitively downstream of a failure is marked
//! skipped. The run result records a per-step lifecycle and the first
//! failure, if any.

mod error;
mod executor;
mod run;

pub use error::{ExecutionError, StepError};
pub use executor::WorkflowExecutor;
pub use run::{RunResult, RunStatus, StepFailure, StepState, StepStatus};
