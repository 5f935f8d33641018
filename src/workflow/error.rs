//! Runtime error types

use std::time::Duration;
use thiserror::Error;

/// Error returned by an action. The executor treats it opaquely.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("{message}")]
    Failed { message: String },

    #[error("cancelled")]
    Cancelled,

    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("io error: {message}")]
    Io { message: String },

    #[error("timeout after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("unavailable: {message}")]
    Unavailable { message: String },
}

impl ActionError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ActionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Why a single step failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepError {
    #[error(
        "unknown action '{action}' in step '{step}' (registered: {})",
        .known.join(", ")
    )]
    UnknownAction {
        step: String,
        action: String,
        known: Vec<String>,
    },

    #[error("{source}")]
    Action { step: String, source: ActionError },
}

impl StepError {
    pub fn step(&self) -> &str {
        match self {
            StepError::UnknownAction { step, .. } | StepError::Action { step, .. } => step,
        }
    }
}

/// Why a run stopped early
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("step '{step}' failed: {source}")]
    StepFailed { step: String, source: StepError },

    #[error("run cancelled before step '{step}'")]
    Cancelled { step: String },
}

impl RunError {
    /// Id of the step the run stopped at
    pub fn step(&self) -> &str {
        match self {
            RunError::StepFailed { step, .. } | RunError::Cancelled { step } => step,
        }
    }
}
