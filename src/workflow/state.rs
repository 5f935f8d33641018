//! Step results and run reports

use super::error::{RunError, StepError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::NotStarted => "not started",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Outcome of one executed step
///
/// Serializes as `{"stepId", "output"?, "error"?}`: `output` is omitted when
/// empty and `error` is its message, omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub output: String,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<StepError>,

    #[serde(skip)]
    pub duration: Duration,

    /// Output was synthesized instead of calling the action
    #[serde(skip)]
    pub dry_run: bool,
}

fn serialize_error<S: Serializer>(error: &Option<StepError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.serialize_str(&e.to_string()),
        None => s.serialize_none(),
    }
}

impl StepResult {
    pub fn success(step_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            output: output.into(),
            error: None,
            duration: Duration::ZERO,
            dry_run: false,
        }
    }

    /// A failed step. Its output is always empty.
    pub fn failure(step_id: impl Into<String>, error: StepError) -> Self {
        Self {
            step_id: step_id.into(),
            output: String::new(),
            error: Some(error),
            duration: Duration::ZERO,
            dry_run: false,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything a run produced, including partial results on abort
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Workflow name
    pub workflow: String,

    /// Results in step order, up to and including the step that aborted
    pub results: Vec<StepResult>,

    /// Set when the run stopped early
    pub error: Option<RunError>,

    /// Total execution time
    pub duration: Duration,

    /// Final state (`Completed` or `Aborted`)
    pub state: RunState,
}

impl RunReport {
    /// True if no unpolicied failure stopped the run
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn result(&self, step_id: &str) -> Option<&StepResult> {
        self.results.iter().find(|r| r.step_id == step_id)
    }

    /// Get a specific step's output
    pub fn output(&self, step_id: &str) -> Option<&str> {
        self.result(step_id).map(|r| r.output.as_str())
    }

    /// Steps that recorded an error, including skipped ones
    pub fn failed_steps(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.failed())
            .map(|r| r.step_id.as_str())
            .collect()
    }

    /// Output of the last step that produced one
    pub fn final_output(&self) -> Option<&str> {
        self.results
            .iter()
            .rev()
            .find(|r| !r.output.is_empty())
            .map(|r| r.output.as_str())
    }

    pub fn into_result(self) -> Result<Vec<StepResult>, (Vec<StepResult>, RunError)> {
        match self.error {
            None => Ok(self.results),
            Some(err) => Err((self.results, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::ActionError;

    fn action_error(step: &str, msg: &str) -> StepError {
        StepError::Action {
            step: step.into(),
            source: ActionError::failed(msg),
        }
    }

    #[test]
    fn test_serialize_success_omits_error() {
        let result = StepResult::success("read", "hello");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"stepId": "read", "output": "hello"}));
    }

    #[test]
    fn test_serialize_failure_omits_empty_output() {
        let result = StepResult::failure("send", action_error("send", "smtp refused"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"stepId": "send", "error": "smtp refused"})
        );
    }

    #[test]
    fn test_serialize_empty_success() {
        let json = serde_json::to_string(&StepResult::success("noop", "")).unwrap();
        assert_eq!(json, r#"{"stepId":"noop"}"#);
    }

    #[test]
    fn test_report_helpers() {
        let report = RunReport {
            workflow: "digest".into(),
            results: vec![
                StepResult::success("read", "text"),
                StepResult::failure("summarize", action_error("summarize", "quota")),
                StepResult::success("mail", ""),
            ],
            error: None,
            duration: Duration::from_millis(10),
            state: RunState::Completed,
        };

        assert!(report.success());
        assert_eq!(report.output("read"), Some("text"));
        assert_eq!(report.output("missing"), None);
        assert_eq!(report.failed_steps(), vec!["summarize"]);
        assert_eq!(report.final_output(), Some("text"));
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_report_into_result_on_abort() {
        let err = RunError::StepFailed {
            step: "read".into(),
            source: action_error("read", "missing file"),
        };
        let report = RunReport {
            workflow: "digest".into(),
            results: vec![StepResult::failure("read", action_error("read", "missing file"))],
            error: Some(err.clone()),
            duration: Duration::ZERO,
            state: RunState::Aborted,
        };

        let (results, got) = report.into_result().unwrap_err();
        assert_eq!(results.len(), 1);
        assert_eq!(got, err);
    }

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::Aborted.to_string(), "aborted");
        assert_eq!(RunState::NotStarted.to_string(), "not started");
    }
}
