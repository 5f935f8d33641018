//! CLI module for docflow
//!
//! This module provides:
//! - Command implementations (run, validate, actions)
//! - Output handlers (console, JSON, quiet)
//! - Signal handling for graceful shutdown
//!
//! # Example
//!
//! ```ignore
//! use docflow::cli::{commands, output};
//!
//! let handler = output::create_handler(output::OutputMode::Console, false);
//! let exit_code =
//!     commands::run_workflow("digest", None, options, &config, handler, token).await?;
//! ```

pub mod commands;
pub mod output;
pub mod signals;

pub use commands::{
    RunOptions, builtin_registry, execute_workflow, list_actions, run_workflow, validate_workflow,
};
pub use output::{OutputMode, create_handler, render_report};
pub use signals::setup_signal_handlers;
