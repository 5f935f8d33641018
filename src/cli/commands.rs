//! CLI command implementations

use super::output::{OutputMode, render_report};
use crate::actions::register_builtin;
use crate::config::{DocflowConfig, load_workflow};
use crate::interpolate::check_references;
use crate::workflow::{
    ActionRegistry, CancellationToken, Executor, OutputEvent, OutputHandler, RunReport,
};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Flags for a single `run`
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub verbose: bool,
    pub output: OutputMode,
}

/// Build the registry the binary runs with
pub fn builtin_registry(config: &DocflowConfig, working_dir: Option<&Path>) -> ActionRegistry {
    let mut config = config.clone();
    // Relative file paths follow --dir unless a base_dir is configured
    if config.files.base_dir.is_none() {
        config.files.base_dir = working_dir.map(Path::to_path_buf);
    }

    let mut registry = ActionRegistry::new();
    register_builtin(&mut registry, &config);
    registry
}

/// Load and execute a workflow, returning the run report
pub async fn execute_workflow(
    workflow_name: &str,
    working_dir: Option<&Path>,
    options: RunOptions,
    config: &DocflowConfig,
    handler: Arc<dyn OutputHandler>,
    cancel: CancellationToken,
) -> anyhow::Result<RunReport> {
    let workflow = load_workflow(workflow_name, working_dir)
        .with_context(|| format!("Failed to load workflow '{}'", workflow_name))?;

    for issue in check_references(&workflow) {
        tracing::warn!("{}", issue);
    }

    let report = Executor::new(builtin_registry(config, working_dir))
        .dry_run(options.dry_run)
        .verbose(options.verbose)
        .with_handler(handler)
        .run(&workflow, cancel)
        .await;

    Ok(report)
}

/// Run a workflow and print its result, returning the process exit code
pub async fn run_workflow(
    workflow_name: &str,
    working_dir: Option<&Path>,
    options: RunOptions,
    config: &DocflowConfig,
    handler: Arc<dyn OutputHandler>,
    cancel: CancellationToken,
) -> anyhow::Result<i32> {
    let report =
        execute_workflow(workflow_name, working_dir, options, config, handler, cancel).await?;

    if let Some(rendered) = render_report(options.output, &report) {
        println!("{}", rendered);
    }

    Ok(if report.success() { 0 } else { 1 })
}

/// Validate a workflow, reporting suspicious step references as warnings
pub fn validate_workflow(
    workflow_name: &str,
    working_dir: Option<&Path>,
    handler: &dyn OutputHandler,
) -> i32 {
    let workflow = match load_workflow(workflow_name, working_dir) {
        Ok(wf) => wf,
        Err(e) => {
            handler.emit(OutputEvent::WorkflowError {
                error: format!("✗ Workflow '{}' is invalid: {}", workflow_name, e),
            });
            return 1;
        }
    };

    handler.emit(OutputEvent::Info {
        message: format!(
            "✓ Workflow '{}' is valid ({} steps)",
            workflow.name,
            workflow.steps.len()
        ),
    });

    let issues = check_references(&workflow);
    for issue in &issues {
        handler.emit(OutputEvent::Info {
            message: format!("  warning: {}", issue),
        });
    }

    0
}

/// List the registered action names
pub fn list_actions(config: &DocflowConfig, handler: &dyn OutputHandler) {
    let registry = builtin_registry(config, None);
    for name in registry.names() {
        handler.emit(OutputEvent::Info { message: name });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Mock handler for testing
    #[derive(Default)]
    struct MockHandler {
        events: Mutex<Vec<OutputEvent>>,
    }

    impl MockHandler {
        fn messages(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    OutputEvent::Info { message } => Some(message.clone()),
                    OutputEvent::WorkflowError { error } => Some(error.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl OutputHandler for MockHandler {
        fn emit(&self, event: OutputEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn project(name: &str, yaml: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let workflows = dir.path().join(".docflow/workflows");
        std::fs::create_dir_all(&workflows).unwrap();
        std::fs::write(workflows.join(format!("{}.yaml", name)), yaml).unwrap();
        dir
    }

    const DIGEST: &str = r#"
name: digest
steps:
  - id: load
    action: file.read
    input: notes.txt
  - id: summary
    action: ai.summarize
    input: "${{ steps.load.output }}"
  - id: save
    action: file.write
    input: "Summary: ${{ steps.summary.output }}"
    to: out/digest.txt
"#;

    #[tokio::test]
    async fn test_execute_dry_run_end_to_end() {
        let dir = project("digest", DIGEST);
        std::fs::write(dir.path().join("notes.txt"), "abcde").unwrap();

        let options = RunOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = execute_workflow(
            "digest",
            Some(dir.path()),
            options,
            &DocflowConfig::default(),
            Arc::new(MockHandler::default()),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(report.success());
        assert_eq!(
            report.output("summary"),
            Some("[dry-run] would call ai.summarize with 5 chars of input")
        );
        let written = std::fs::read_to_string(dir.path().join("out/digest.txt")).unwrap();
        assert_eq!(
            written,
            "Summary: [dry-run] would call ai.summarize with 5 chars of input"
        );
    }

    #[tokio::test]
    async fn test_run_without_provider_aborts() {
        let dir = project("digest", DIGEST);
        std::fs::write(dir.path().join("notes.txt"), "abcde").unwrap();

        let code = run_workflow(
            "digest",
            Some(dir.path()),
            RunOptions::default(),
            &DocflowConfig::default(),
            Arc::new(MockHandler::default()),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(code, 1);
        assert!(!dir.path().join("out/digest.txt").exists());
    }

    #[tokio::test]
    async fn test_run_missing_workflow_is_error() {
        let dir = TempDir::new().unwrap();
        let err = run_workflow(
            "absent",
            Some(dir.path()),
            RunOptions::default(),
            &DocflowConfig::default(),
            Arc::new(MockHandler::default()),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(format!("{:#}", err).contains("absent"));
    }

    #[test]
    fn test_validate_reports_forward_reference() {
        let dir = project(
            "fwd",
            r#"
name: fwd
steps:
  - id: a
    action: text.echo
    input: "${{ steps.b.output }}"
  - id: b
    action: text.echo
    input: hi
"#,
        );
        let handler = MockHandler::default();
        assert_eq!(validate_workflow("fwd", Some(dir.path()), &handler), 0);

        let messages = handler.messages();
        assert!(messages[0].contains("is valid (2 steps)"));
        assert!(messages.iter().any(|m| m.contains("warning") && m.contains("'b'")));
    }

    #[test]
    fn test_validate_invalid_definition() {
        let dir = project("bad", "name: bad\nsteps: []\n");
        let handler = MockHandler::default();
        assert_eq!(validate_workflow("bad", Some(dir.path()), &handler), 1);
        assert!(handler.messages()[0].contains("invalid"));
    }

    #[test]
    fn test_list_actions() {
        let handler = MockHandler::default();
        list_actions(&DocflowConfig::default(), &handler);

        let names = handler.messages();
        assert!(names.contains(&"text.echo".to_string()));
        assert!(names.contains(&"ai.translate".to_string()));
        assert!(!names.contains(&"shell.run".to_string()));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
