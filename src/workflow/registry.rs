//! Action registry: name to callable

use super::cancel::CancellationToken;
use super::error::ActionError;
use crate::config::StepDefinition;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What an action gets to know about the run it is part of
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Workflow name
    pub workflow: String,
    /// Zero-based position of the step
    pub step_index: usize,
    /// Number of steps in the workflow
    pub total_steps: usize,
    /// Cancelled when the caller wants the run to stop
    pub cancel: CancellationToken,
}

impl ActionContext {
    pub fn new(workflow: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            workflow: workflow.into(),
            step_index: 0,
            total_steps: 0,
            cancel,
        }
    }

    /// Return `ActionError::Cancelled` if the run has been cancelled
    pub fn check_cancelled(&self) -> Result<(), ActionError> {
        if self.cancel.is_cancelled() {
            Err(ActionError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// An external capability invoked by a step
///
/// `step` is the resolved copy (placeholders already substituted) and
/// `input` is its effective input.
#[async_trait]
pub trait Action: Send + Sync {
    async fn call(
        &self,
        ctx: &ActionContext,
        step: &StepDefinition,
        input: &str,
    ) -> Result<String, ActionError>;
}

/// Adapts a synchronous closure into an [`Action`]
pub struct FnAction<F>(pub F);

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(&ActionContext, &StepDefinition, &str) -> Result<String, ActionError> + Send + Sync,
{
    async fn call(
        &self,
        ctx: &ActionContext,
        step: &StepDefinition,
        input: &str,
    ) -> Result<String, ActionError> {
        (self.0)(ctx, step, input)
    }
}

/// Maps action names to callables
///
/// Populated before a run and only read by the executor. Registering a name
/// twice replaces the earlier binding.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `action`, replacing any previous binding
    pub fn register(&mut self, name: impl Into<String>, action: impl Action + 'static) {
        self.register_arc(name, Arc::new(action));
    }

    pub fn register_arc(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        let name = name.into();
        if self.actions.insert(name.clone(), action).is_some() {
            tracing::debug!(action = %name, "Replaced registered action");
        }
    }

    /// Bind `name` to a synchronous closure
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&ActionContext, &StepDefinition, &str) -> Result<String, ActionError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, FnAction(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
