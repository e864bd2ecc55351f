use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use granary_executor::WorkflowExecutor;
use granary_warehouse::MemoryWarehouse;
use granary_workflow::WorkflowDef;

mod pipeline;

/// Granary - a declarative warehouse load-and-check workflow runner
#[derive(Parser)]
#[command(name = "granary")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow definition from a JSON file
  Run {
    /// Path to the workflow definition (JSON)
    workflow_file: PathBuf,
  },

  /// Run the bundled forest-fires pipeline
  Demo,

  /// Validate a workflow definition without executing it
  Validate {
    /// Path to the workflow definition (JSON)
    workflow_file: PathBuf,
  },
}

fn main() -> Result<()> {
  init_tracing();

  let cli = Cli::parse();
  let rt = tokio::runtime::Runtime::new()?;

  match cli.command {
    Commands::Run { workflow_file } => {
      let def = rt.block_on(load_definition(&workflow_file))?;
      rt.block_on(run_definition(def))
    }
    Commands::Demo => rt.block_on(run_definition(pipeline::forest_fires_definition())),
    Commands::Validate { workflow_file } => {
      let def = rt.block_on(load_definition(&workflow_file))?;
      validate_definition(def)
    }
  }
}

fn init_tracing() {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn load_definition(workflow_file: &PathBuf) -> Result<WorkflowDef> {
  let content = tokio::fs::read_to_string(workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

async fn run_definition(def: WorkflowDef) -> Result<()> {
  let workflow = def.build().context("invalid workflow definition")?;
  eprintln!("Loaded workflow: {}", workflow.name());

  let warehouse = Arc::new(MemoryWarehouse::new());
  let executor = WorkflowExecutor::new(warehouse);

  let cancel = CancellationToken::new();
  let result = executor
    .execute(&workflow, cancel)
    .await
    .context("workflow execution failed")?;

  eprintln!("Run {} finished: {:?}", result.run_id, result.status);
  println!("{}", serde_json::to_string_pretty(&result.steps)?);

  if let Some(failure) = result.failure {
    anyhow::bail!("step '{}' failed: {}", failure.step_id, failure.error);
  }

  Ok(())
}

fn validate_definition(def: WorkflowDef) -> Result<()> {
  let workflow = def.build().context("invalid workflow definition")?;

  eprintln!(
    "Workflow '{}' is valid ({} steps)",
    workflow.name(),
    workflow.steps().len()
  );
  for step in workflow.steps() {
    if step.depends_on.is_empty() {
      println!("{} [{}]", step.step_id, step.operation.kind());
    } else {
      println!(
        "{} [{}] after {}",
        step.step_id,
        step.operation.kind(),
        step.depends_on.join(", ")
      );
    }
  }

  Ok(())
}
