//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes.

use crate::workflow::{OutputEvent, OutputHandler, RunReport};
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            other => Err(format!(
                "unknown output mode '{}' (expected console, json or quiet)",
                other
            )),
        }
    }
}

/// Console output handler, progress goes to stderr
pub struct ConsoleHandler {
    debug: bool,
}

impl ConsoleHandler {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn format_duration(ms: u64) -> String {
        if ms < 1000 {
            format!("{}ms", ms)
        } else {
            format!("{:.1}s", ms as f64 / 1000.0)
        }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::WorkflowStart {
                name,
                steps,
                dry_run,
            } => {
                let mode = if dry_run { " [dry-run]" } else { "" };
                eprintln!("Running workflow '{}' ({} steps){}", name, steps, mode);
            }
            OutputEvent::StepStart {
                name,
                action,
                index,
                total,
            } => {
                eprint!("[{}/{}] {} ({})... ", index, total, name, action);
                let _ = io::stderr().flush();
            }
            OutputEvent::StepComplete {
                duration_ms,
                success,
                dry_run,
                ..
            } => {
                if !success {
                    eprintln!("✗ ({})", Self::format_duration(duration_ms));
                } else if dry_run {
                    eprintln!("✓ (dry-run)");
                } else {
                    eprintln!("✓ ({})", Self::format_duration(duration_ms));
                }
            }
            OutputEvent::StepPreview { preview, .. } => {
                for line in preview.lines() {
                    eprintln!("    │ {}", line);
                }
            }
            OutputEvent::StepError {
                name,
                error,
                skipped,
            } => {
                if skipped {
                    eprintln!("    Step '{}' failed, skipping: {}", name, error);
                } else {
                    eprintln!("    Error in step '{}': {}", name, error);
                }
            }
            OutputEvent::WorkflowComplete {
                success,
                duration_ms,
                steps_completed,
            } => {
                eprintln!();
                if success {
                    eprintln!(
                        "✓ Workflow completed successfully ({} steps in {})",
                        steps_completed,
                        Self::format_duration(duration_ms)
                    );
                } else {
                    eprintln!(
                        "✗ Workflow aborted after {} steps ({})",
                        steps_completed,
                        Self::format_duration(duration_ms)
                    );
                }
            }
            OutputEvent::WorkflowError { error } => {
                eprintln!("Error: {}", error);
            }
            OutputEvent::Info { message } => {
                eprintln!("{}", message);
            }
            OutputEvent::Debug { message } => {
                if self.debug {
                    eprintln!("[debug] {}", message);
                }
            }
        }
    }
}

/// JSON handler: one event object per line on stderr
pub struct JsonHandler;

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        if let Ok(line) = serde_json::to_string(&event) {
            eprintln!("{}", line);
        }
    }
}

/// Quiet handler that emits nothing
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, _event: OutputEvent) {}
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode, debug: bool) -> Arc<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Arc::new(ConsoleHandler::new(debug)),
        OutputMode::Json => Arc::new(JsonHandler),
        OutputMode::Quiet => Arc::new(QuietHandler),
    }
}

/// Render the final result of a run for stdout
///
/// JSON mode prints the ordered `StepResult` array. The other modes print
/// the output of the last step that produced one.
pub fn render_report(mode: OutputMode, report: &RunReport) -> Option<String> {
    match mode {
        OutputMode::Json => to_json(&report.results),
        OutputMode::Console | OutputMode::Quiet => report.final_output().map(str::to_string),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize results");
            None
        }
    }
}
