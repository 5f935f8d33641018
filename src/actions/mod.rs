//! Built-in actions registered by the `docflow` binary
//!
//! The executor knows nothing about these; they are ordinary collaborators
//! bound into an [`ActionRegistry`] before a run. Library users can
//! register their own actions over any of them.

mod file;
mod shell;

pub use file::{FileRead, FileWrite};
pub use shell::ShellAction;

use crate::config::DocflowConfig;
use crate::workflow::{ActionError, ActionRegistry};

/// Names bound to placeholders until a real inference provider is registered
pub const AI_PLACEHOLDERS: [&str; 3] = ["ai.summarize", "ai.extract", "ai.translate"];

/// Register every built-in action allowed by `config`
pub fn register_builtin(registry: &mut ActionRegistry, config: &DocflowConfig) {
    registry.register_fn("text.echo", |_, _, input| Ok(input.to_string()));
    registry.register_fn("text.template", |_, step, _| {
        if step.template.is_empty() {
            Err(ActionError::missing_field("template"))
        } else {
            Ok(step.template.clone())
        }
    });

    let base_dir = config.files.base_dir.clone();
    registry.register("file.read", FileRead::new(base_dir.clone()));
    registry.register("file.write", FileWrite::new(base_dir));

    if config.shell.enabled() {
        registry.register("shell.run", ShellAction::from_config(&config.shell));
    }

    for name in AI_PLACEHOLDERS {
        registry.register_fn(name, move |_, _, _| {
            Err(ActionError::unavailable(format!(
                "no inference provider configured for '{}'",
                name
            )))
        });
    }

    tracing::debug!(actions = registry.len(), "Registered built-in actions");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StepDefinition;
    use crate::workflow::{ActionContext, CancellationToken};

    fn ctx() -> ActionContext {
        ActionContext::new("test", CancellationToken::new())
    }

    #[test]
    fn test_shell_only_when_enabled() {
        let mut registry = ActionRegistry::new();
        register_builtin(&mut registry, &DocflowConfig::default());
        assert!(!registry.contains("shell.run"));
        assert!(registry.contains("file.read"));
        assert!(registry.contains("ai.summarize"));

        let mut config = DocflowConfig::default();
        config.shell.enabled = Some(true);
        let mut registry = ActionRegistry::new();
        register_builtin(&mut registry, &config);
        assert!(registry.contains("shell.run"));
    }

    #[tokio::test]
    async fn test_text_actions() {
        let mut registry = ActionRegistry::new();
        register_builtin(&mut registry, &DocflowConfig::default());

        let step = StepDefinition::new("e", "text.echo");
        let out = registry
            .get("text.echo")
            .unwrap()
            .call(&ctx(), &step, "same")
            .await
            .unwrap();
        assert_eq!(out, "same");

        let mut step = StepDefinition::new("t", "text.template");
        step.template = "Dear team".into();
        let out = registry
            .get("text.template")
            .unwrap()
            .call(&ctx(), &step, "")
            .await
            .unwrap();
        assert_eq!(out, "Dear team");
    }

    #[tokio::test]
    async fn test_ai_placeholder_unavailable() {
        let mut registry = ActionRegistry::new();
        register_builtin(&mut registry, &DocflowConfig::default());

        let step = StepDefinition::new("s", "ai.summarize");
        let err = registry
            .get("ai.summarize")
            .unwrap()
            .call(&ctx(), &step, "text")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Unavailable { .. }));
        assert!(err.to_string().contains("ai.summarize"));
    }
}
