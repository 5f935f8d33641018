//! Error types for workflow definitions

use thiserror::Error;

/// Errors raised while loading or validating a workflow definition.
///
/// Validation variants are reported in a fixed order (name, steps, then each
/// step in turn) and the first failure wins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("workflow is missing a name")]
    MissingName,

    #[error("workflow has no steps")]
    EmptySteps,

    #[error("step #{index} is missing an id")]
    MissingStepId { index: usize },

    #[error("duplicate step id: {id}")]
    DuplicateStepId { id: String },

    #[error("step '{id}' is missing an action")]
    MissingAction { id: String },

    #[error("failed to parse {format} workflow: {message}")]
    Parse { format: &'static str, message: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("workflow '{name}' not found")]
    NotFound { name: String },
}

impl DefinitionError {
    /// Returns true for errors produced by structural validation, as
    /// opposed to errors reading or parsing the source text.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DefinitionError::MissingName
                | DefinitionError::EmptySteps
                | DefinitionError::MissingStepId { .. }
                | DefinitionError::DuplicateStepId { .. }
                | DefinitionError::MissingAction { .. }
        )
    }

    pub(crate) fn yaml(err: serde_yaml::Error) -> Self {
        Self::Parse {
            format: "yaml",
            message: err.to_string(),
        }
    }

    pub(crate) fn toml(err: toml::de::Error) -> Self {
        Self::Parse {
            format: "toml",
            message: err.to_string(),
        }
    }
}
