//! Workflow execution engine for docflow
//!
//! This module handles:
//! - The action registry and the `Action` trait implemented by collaborators
//! - Sequential step execution with `${{ }}` interpolation
//! - Per-step failure policy (`fail` aborts, `skip` records and continues)
//! - Dry-run mode for `ai.*` actions
//! - Progress events and cooperative cancellation
//!
//! # Example
//!
//! ```ignore
//! use docflow::config::load_workflow;
//! use docflow::workflow::{ActionRegistry, CancellationToken, Executor};
//!
//! let mut registry = ActionRegistry::new();
//! registry.register_fn("text.echo", |_, _, input| Ok(input.to_string()));
//!
//! let workflow = load_workflow("digest", None)?;
//! let report = Executor::new(registry)
//!     .dry_run(true)
//!     .run(&workflow, CancellationToken::new())
//!     .await;
//!
//! if report.success() {
//!     println!("{}", report.final_output().unwrap_or_default());
//! }
//! ```

mod cancel;
mod error;
mod events;
mod executor;
mod registry;
mod state;

pub use cancel::CancellationToken;
pub use error::{ActionError, RunError, StepError};
pub use events::{NullHandler, OutputEvent, OutputHandler};
pub use executor::{DRY_RUN_MARKER, DRY_RUN_PREFIX, Executor, describe_dry_run};
pub use registry::{Action, ActionContext, ActionRegistry, FnAction};
pub use state::{RunReport, RunState, StepResult};
