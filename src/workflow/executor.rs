//! Sequential workflow executor

use super::cancel::CancellationToken;
use super::error::{RunError, StepError};
use super::events::{NullHandler, OutputEvent, OutputHandler};
use super::registry::{ActionContext, ActionRegistry};
use super::state::{RunReport, RunState, StepResult};
use crate::config::{OnFailure, StepDefinition, WorkflowDefinition};
use crate::interpolate::{EnvSource, InterpolationContext, ProcessEnv, resolve_step};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Actions with this prefix are not invoked in dry-run mode
pub const DRY_RUN_PREFIX: &str = "ai.";

/// Marker at the start of every dry-run output
pub const DRY_RUN_MARKER: &str = "[dry-run]";

const PREVIEW_CHARS: usize = 200;

/// Runs one workflow, step by step.
///
/// Each step is resolved against the results of the steps before it,
/// dispatched to the registry (or described, in dry-run mode), and recorded.
/// A failing step either aborts the run or is recorded and skipped,
/// depending on its `on_failure` policy.
///
/// `run` consumes the executor, so one executor is one run.
pub struct Executor {
    registry: ActionRegistry,
    results: HashMap<String, StepResult>,
    dry_run: bool,
    verbose: bool,
    handler: Arc<dyn OutputHandler>,
    env: Arc<dyn EnvSource>,
}

impl Executor {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            results: HashMap::new(),
            dry_run: false,
            verbose: false,
            handler: Arc::new(NullHandler),
            env: Arc::new(ProcessEnv),
        }
    }

    /// Describe `ai.*` steps instead of invoking them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Emit output previews after each step
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn OutputHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Environment used for `env.<NAME>` placeholders
    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    /// Run the workflow to completion or to the first unpolicied failure.
    ///
    /// Results produced before an abort are always returned in the report.
    pub async fn run(
        mut self,
        workflow: &WorkflowDefinition,
        cancel: CancellationToken,
    ) -> RunReport {
        let started = Instant::now();
        let total = workflow.steps.len();

        tracing::info!(
            workflow = %workflow.name,
            steps = total,
            dry_run = self.dry_run,
            "Starting workflow"
        );
        self.handler.emit(OutputEvent::WorkflowStart {
            name: workflow.name.clone(),
            steps: total,
            dry_run: self.dry_run,
        });

        let mut results = Vec::with_capacity(total);
        let mut error = None;

        for (index, step) in workflow.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(step = %step.id, "Run cancelled");
                error = Some(RunError::Cancelled {
                    step: step.id.clone(),
                });
                break;
            }

            self.handler.emit(OutputEvent::StepStart {
                name: step.id.clone(),
                action: step.action.clone(),
                index: index + 1,
                total,
            });

            let ctx = ActionContext {
                workflow: workflow.name.clone(),
                step_index: index,
                total_steps: total,
                cancel: cancel.clone(),
            };
            let result = self.execute_step(step, &ctx).await;

            match &result.error {
                None => self.report_success(&result),
                Some(err) => {
                    let skipped = step.on_failure == OnFailure::Skip;
                    self.report_failure(&result, err, skipped);
                    if !skipped {
                        error = Some(RunError::StepFailed {
                            step: step.id.clone(),
                            source: err.clone(),
                        });
                    }
                }
            }

            self.results.insert(step.id.clone(), result.clone());
            results.push(result);

            if error.is_some() {
                break;
            }
        }

        let state = if error.is_some() {
            RunState::Aborted
        } else {
            RunState::Completed
        };

        let duration = started.elapsed();
        match &error {
            None => tracing::info!(
                workflow = %workflow.name,
                duration_ms = duration.as_millis() as u64,
                "Workflow completed"
            ),
            Some(err) => {
                tracing::error!(workflow = %workflow.name, error = %err, "Workflow aborted");
                self.handler.emit(OutputEvent::WorkflowError {
                    error: err.to_string(),
                });
            }
        }
        self.handler.emit(OutputEvent::WorkflowComplete {
            success: error.is_none(),
            duration_ms: duration.as_millis() as u64,
            steps_completed: results.len(),
        });

        RunReport {
            workflow: workflow.name.clone(),
            results,
            error,
            duration,
            state,
        }
    }

    /// Resolve, dispatch and time a single step
    async fn execute_step(&self, step: &StepDefinition, ctx: &ActionContext) -> StepResult {
        let started = Instant::now();

        // Only steps recorded so far are visible here
        let resolved = {
            let interp = InterpolationContext::new(&self.results, self.env.as_ref());
            resolve_step(step, &interp)
        };
        let input = resolved.effective_input();
        self.handler.emit(OutputEvent::Debug {
            message: format!(
                "step '{}' resolved to {} chars of input",
                step.id,
                input.chars().count()
            ),
        });

        if self.dry_run && resolved.action.starts_with(DRY_RUN_PREFIX) {
            tracing::debug!(step = %step.id, action = %resolved.action, "Dry-run, not dispatching");
            let mut result = StepResult::success(&step.id, describe_dry_run(&resolved.action, input))
                .with_duration(started.elapsed());
            result.dry_run = true;
            return result;
        }

        let outcome = self.dispatch(&resolved, input, ctx).await;
        let result = match outcome {
            Ok(output) => StepResult::success(&step.id, output),
            Err(err) => StepResult::failure(&step.id, err),
        };
        result.with_duration(started.elapsed())
    }

    async fn dispatch(
        &self,
        step: &StepDefinition,
        input: &str,
        ctx: &ActionContext,
    ) -> Result<String, StepError> {
        let Some(action) = self.registry.get(&step.action) else {
            return Err(StepError::UnknownAction {
                step: step.id.clone(),
                action: step.action.clone(),
                known: self.registry.names(),
            });
        };

        tracing::debug!(
            step = %step.id,
            action = %step.action,
            input_len = input.len(),
            "Dispatching step"
        );

        action
            .call(ctx, step, input)
            .await
            .map_err(|source| StepError::Action {
                step: step.id.clone(),
                source,
            })
    }

    fn report_success(&self, result: &StepResult) {
        let duration_ms = result.duration.as_millis() as u64;
        tracing::debug!(step = %result.step_id, duration_ms, "Step completed");
        self.handler.emit(OutputEvent::StepComplete {
            name: result.step_id.clone(),
            duration_ms,
            success: true,
            dry_run: result.dry_run,
        });
        if self.verbose {
            self.handler.emit(OutputEvent::StepPreview {
                name: result.step_id.clone(),
                preview: preview(&result.output),
            });
        }
    }

    fn report_failure(&self, result: &StepResult, err: &StepError, skipped: bool) {
        if skipped {
            tracing::warn!(step = %result.step_id, error = %err, "Step failed, skipping");
        } else {
            tracing::debug!(step = %result.step_id, error = %err, "Step failed");
        }
        self.handler.emit(OutputEvent::StepComplete {
            name: result.step_id.clone(),
            duration_ms: result.duration.as_millis() as u64,
            success: false,
            dry_run: false,
        });
        self.handler.emit(OutputEvent::StepError {
            name: result.step_id.clone(),
            error: err.to_string(),
            skipped,
        });
    }
}

/// Output recorded for a step skipped by dry-run
pub fn describe_dry_run(action: &str, input: &str) -> String {
    format!(
        "{} would call {} with {} chars of input",
        DRY_RUN_MARKER,
        action,
        input.chars().count()
    )
}

fn preview(output: &str) -> String {
    let mut chars = output.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
