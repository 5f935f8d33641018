//! Static checks on `steps.<id>.output` references
//!
//! A reference to a step that runs later (or to the referencing step itself)
//! always resolves to an empty string, and a reference to an id that does
//! not exist does too. Neither is an error at run time; these checks let
//! `docflow validate` point them out before a run.

use super::engine::{extract_expressions, step_reference};
use crate::config::{StepDefinition, WorkflowDefinition};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// The referenced step has not run yet when this step is resolved
    Forward,
    /// No step with that id exists
    Unknown,
}

/// A suspicious reference found in a step field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceIssue {
    pub step: String,
    pub field: String,
    pub referenced: String,
    pub kind: ReferenceKind,
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReferenceKind::Forward => write!(
                f,
                "step '{}' field '{}' references step '{}' before it runs; it will be empty",
                self.step, self.field, self.referenced
            ),
            ReferenceKind::Unknown => write!(
                f,
                "step '{}' field '{}' references unknown step '{}'; it will be empty",
                self.step, self.field, self.referenced
            ),
        }
    }
}

/// Interpolatable fields of a step, labelled by name
pub fn interpolatable_fields(step: &StepDefinition) -> Vec<(String, &str)> {
    let mut fields = vec![
        ("input".to_string(), step.input.as_str()),
        ("template".to_string(), step.template.as_str()),
        ("data".to_string(), step.data.as_str()),
        ("to".to_string(), step.to.as_str()),
        ("subject".to_string(), step.subject.as_str()),
        ("attach".to_string(), step.attach.as_str()),
    ];
    for (key, value) in &step.options {
        fields.push((format!("options.{}", key), value.as_str()));
    }
    fields
}

/// Step ids referenced through `steps.<id>.output` in `text`, in order
pub fn extract_references(text: &str) -> Vec<&str> {
    extract_expressions(text)
        .into_iter()
        .filter_map(step_reference)
        .collect()
}

/// Find forward and unknown step references in a workflow
pub fn check_references(workflow: &WorkflowDefinition) -> Vec<ReferenceIssue> {
    let mut issues = Vec::new();

    for (index, step) in workflow.steps.iter().enumerate() {
        for (field, text) in interpolatable_fields(step) {
            for referenced in extract_references(text) {
                let kind = match workflow.position(referenced) {
                    Some(pos) if pos < index => continue,
                    Some(_) => ReferenceKind::Forward,
                    None => ReferenceKind::Unknown,
                };
                issues.push(ReferenceIssue {
                    step: step.id.clone(),
                    field: field.clone(),
                    referenced: referenced.to_string(),
                    kind,
                });
            }
        }
    }

    issues
}
