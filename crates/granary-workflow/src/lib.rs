//! Granary Workflow
//!
//! This crate provides the declarative side of granary: workflow definitions,
//! step operations, table schemas, and the validated dependency graph.
//!
//! A [`WorkflowDef`] is the serializable form (JSON files, embedded
//! declarations). Calling [`WorkflowDef::build`] validates the step ids and
//! dependency edges and produces a [`Workflow`] that is ready to hand to an
//! executor. Validation catches duplicate ids, references to undeclared
//! steps, and dependency cycles.

mod error;
mod graph;
mod schema;
mod step;
mod workflow;

pub use error::WorkflowError;
pub use graph::Graph;
pub use schema::{Column, ColumnMode, ColumnType, TableSchema};
pub use step::{Operation, StepDef};
pub use workflow::{Workflow, WorkflowDef};
