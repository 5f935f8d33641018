//! docflow: declarative document-processing workflows
//!
//! A workflow is an ordered list of steps, each naming an action from an
//! [`workflow::ActionRegistry`]. Step fields may reference earlier outputs,
//! the date and environment variables through `${{ ... }}` placeholders.

pub mod actions;
pub mod cli;
pub mod config;
pub mod interpolate;
pub mod logging;
pub mod workflow;
