//! Progress events emitted by the executor

use serde::{Deserialize, Serialize};

/// Events emitted during workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputEvent {
    WorkflowStart {
        name: String,
        steps: usize,
        dry_run: bool,
    },
    StepStart {
        name: String,
        action: String,
        index: usize,
        total: usize,
    },
    StepComplete {
        name: String,
        duration_ms: u64,
        success: bool,
        dry_run: bool,
    },
    /// Only emitted in verbose mode
    StepPreview {
        name: String,
        preview: String,
    },
    StepError {
        name: String,
        error: String,
        skipped: bool,
    },
    WorkflowComplete {
        success: bool,
        duration_ms: u64,
        steps_completed: usize,
    },
    WorkflowError {
        error: String,
    },
    Info {
        message: String,
    },
    Debug {
        message: String,
    },
}

/// Receives progress events. Handlers only observe; they cannot change
/// how the run proceeds.
pub trait OutputHandler: Send + Sync {
    /// Emit an event
    fn emit(&self, event: OutputEvent);
}

/// Handler that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHandler;

impl OutputHandler for NullHandler {
    fn emit(&self, _event: OutputEvent) {}
}
