//! Workflow and step definitions

use super::error::DefinitionError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// What to do when a step's action fails
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Abort the run (default)
    #[default]
    Fail,
    /// Record the error and continue with the next step
    Skip,
}

impl<'de> Deserialize<'de> for OnFailure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        match raw.trim() {
            "" | "fail" => Ok(OnFailure::Fail),
            "skip" => Ok(OnFailure::Skip),
            other => Err(serde::de::Error::unknown_variant(other, &["fail", "skip"])),
        }
    }
}

/// A scalar kept as the text the author wrote
///
/// Asks the format for a string first, so YAML plain scalars such as
/// `1.10` or `0.50` come through verbatim. Formats with typed numbers
/// (TOML) fall back to the value's display form; quote them to keep the
/// exact text.
struct ScalarText(String);

impl<'de> Deserialize<'de> for ScalarText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ScalarTextVisitor).map(ScalarText)
    }
}

struct ScalarTextVisitor;

impl<'de> Visitor<'de> for ScalarTextVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<ScalarText>::deserialize(deserializer)?
        .map(|text| text.0)
        .unwrap_or_default())
}

fn scalar_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let raw = Option::<BTreeMap<String, Option<ScalarText>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.map(|text| text.0).unwrap_or_default()))
        .collect())
}

/// One step of a workflow
///
/// Only `id` and `action` carry meaning for the executor. The remaining
/// string fields are interpolated and handed to the action, which decides
/// which of them it needs. Empty strings mean "not set".
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StepDefinition {
    /// Step identifier (unique within workflow)
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: String,

    /// Registered action to invoke
    #[serde(default)]
    pub action: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,

    /// Action options; every value is interpolated
    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub options: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub attach: String,

    #[serde(default)]
    pub on_failure: OnFailure,
}

impl StepDefinition {
    pub fn new(id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_on_failure(mut self, policy: OnFailure) -> Self {
        self.on_failure = policy;
        self
    }

    /// The input handed to the action: `input` when set, otherwise `data`
    pub fn effective_input(&self) -> &str {
        if self.input.is_empty() {
            &self.data
        } else {
            &self.input
        }
    }

    /// Get an option value by key
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// A complete workflow definition
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorkflowDefinition {
    /// Workflow name
    #[serde(default)]
    pub name: String,

    /// Free-form version label
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl WorkflowDefinition {
    /// Parse and validate a YAML definition
    pub fn from_yaml(source: &str) -> Result<Self, DefinitionError> {
        let workflow: Self = serde_yaml::from_str(source).map_err(DefinitionError::yaml)?;
        workflow.validate()?;
        Ok(workflow)
    }

    /// Parse and validate a TOML definition
    pub fn from_toml(source: &str) -> Result<Self, DefinitionError> {
        let workflow: Self = toml::from_str(source).map_err(DefinitionError::toml)?;
        workflow.validate()?;
        Ok(workflow)
    }

    /// Validate the workflow structure. The first violation is returned.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::MissingName);
        }
        if self.steps.is_empty() {
            return Err(DefinitionError::EmptySteps);
        }

        let mut seen = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            if step.id.is_empty() {
                return Err(DefinitionError::MissingStepId { index });
            }
            if !seen.insert(step.id.as_str()) {
                return Err(DefinitionError::DuplicateStepId {
                    id: step.id.clone(),
                });
            }
            if step.action.is_empty() {
                return Err(DefinitionError::MissingAction {
                    id: step.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Look up a step by id
    pub fn step(&self, id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Position of a step in execution order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }
}
