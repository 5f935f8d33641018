//! Configuration loading with multi-layer merge

use super::error::DefinitionError;
use super::workflow::WorkflowDefinition;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level docflow settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DocflowConfig {
    /// Global defaults
    #[serde(default)]
    pub defaults: Defaults,

    /// Settings for the `shell.run` action
    #[serde(default)]
    pub shell: ShellConfig,

    /// Settings for the `file.*` actions
    #[serde(default)]
    pub files: FilesConfig,
}

/// Global default settings
///
/// Every field is optional so a later layer can tell "unset" apart from an
/// explicit value, including an explicit `false`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Run in dry-run mode unless overridden on the command line
    pub dry_run: Option<bool>,

    /// Emit step previews
    pub verbose: Option<bool>,

    /// Output mode: console, json or quiet
    pub output: Option<String>,

    /// Write logs to this file in addition to stderr
    pub log_file: Option<PathBuf>,
}

impl Defaults {
    pub fn dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}

const DEFAULT_SHELL_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Register the `shell.run` action
    pub enabled: Option<bool>,

    /// Shell command wrapper (for nix-shell, docker, etc.)
    pub command_wrapper: Option<String>,

    /// Timeout in seconds
    pub timeout: Option<u64>,
}

impl ShellConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// Timeout in seconds, 300 unless configured
    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_SHELL_TIMEOUT_SECS)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    /// Directory relative paths are resolved against
    pub base_dir: Option<PathBuf>,
}

impl DocflowConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/docflow/config.toml
    /// 3. .docflow/config.toml (project)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                let user_config = Self::load_file(&user_config_path)
                    .with_context(|| format!("loading {}", user_config_path.display()))?;
                config.merge(user_config);
            }
        }

        let project_config_path = project_dir
            .map(|p| p.join(".docflow/config.toml"))
            .unwrap_or_else(|| PathBuf::from(".docflow/config.toml"));

        if project_config_path.exists() {
            let project_config = Self::load_file(&project_config_path)
                .with_context(|| format!("loading {}", project_config_path.display()))?;
            config.merge(project_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Get the user config path (~/.config/docflow/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("docflow/config.toml"))
    }

    /// Merge another config into this one. Values set in `other` win.
    pub fn merge(&mut self, other: Self) {
        merge_option(&mut self.defaults.dry_run, other.defaults.dry_run);
        merge_option(&mut self.defaults.verbose, other.defaults.verbose);
        merge_option(&mut self.defaults.output, other.defaults.output);
        merge_option(&mut self.defaults.log_file, other.defaults.log_file);

        merge_option(&mut self.shell.enabled, other.shell.enabled);
        merge_option(&mut self.shell.command_wrapper, other.shell.command_wrapper);
        merge_option(&mut self.shell.timeout, other.shell.timeout);

        merge_option(&mut self.files.base_dir, other.files.base_dir);
    }
}

fn merge_option<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

const WORKFLOW_EXTENSIONS: [&str; 3] = ["yaml", "yml", "toml"];

/// Load a workflow by path or by name
///
/// An argument naming an existing file is loaded directly. Otherwise the
/// name is searched for (first match wins):
/// 1. .docflow/workflows/{name}.{yaml,yml,toml} (project)
/// 2. ~/.config/docflow/workflows/{name}.{yaml,yml,toml} (user)
pub fn load_workflow(
    name: &str,
    project_dir: Option<&Path>,
) -> Result<WorkflowDefinition, DefinitionError> {
    let direct = Path::new(name);
    if direct.is_file() {
        return load_workflow_file(direct);
    }

    let project_dir = project_dir
        .map(|p| p.join(".docflow/workflows"))
        .unwrap_or_else(|| PathBuf::from(".docflow/workflows"));
    let user_dir = dirs::config_dir().map(|p| p.join("docflow/workflows"));

    for dir in std::iter::once(project_dir).chain(user_dir) {
        for ext in WORKFLOW_EXTENSIONS {
            let candidate = dir.join(format!("{}.{}", name, ext));
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "Resolved workflow");
                return load_workflow_file(&candidate);
            }
        }
    }

    Err(DefinitionError::NotFound {
        name: name.to_string(),
    })
}

/// Load and validate a workflow file, choosing the format by extension
pub fn load_workflow_file(path: &Path) -> Result<WorkflowDefinition, DefinitionError> {
    let contents = std::fs::read_to_string(path).map_err(|e| DefinitionError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => WorkflowDefinition::from_toml(&contents),
        _ => WorkflowDefinition::from_yaml(&contents),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_empty_config() {
        let config = DocflowConfig::default();
        assert!(!config.defaults.dry_run());
        assert!(!config.shell.enabled());
        assert_eq!(config.shell.timeout(), 300);
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
            [defaults]
            dry_run = true
            output = "json"

            [shell]
            enabled = true
            timeout = 60

            [files]
            base_dir = "/srv/docs"
        "#
        )
        .unwrap();

        let config = DocflowConfig::load_file(&config_path).unwrap();
        assert!(config.defaults.dry_run());
        assert_eq!(config.defaults.output.as_deref(), Some("json"));
        assert!(config.shell.enabled());
        assert_eq!(config.shell.timeout(), 60);
        assert_eq!(config.files.base_dir, Some(PathBuf::from("/srv/docs")));
    }

    #[test]
    fn test_project_config_layer() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".docflow")).unwrap();
        std::fs::write(
            dir.path().join(".docflow/config.toml"),
            "[defaults]\nverbose = true\n",
        )
        .unwrap();

        let config = DocflowConfig::load(Some(dir.path())).unwrap();
        assert!(config.defaults.verbose());
    }

    #[test]
    fn test_config_merge() {
        let mut base = DocflowConfig::default();
        base.shell.command_wrapper = Some("nix-shell --run".into());
        base.defaults.output = Some("console".into());

        let mut override_config = DocflowConfig::default();
        override_config.defaults.output = Some("json".into());
        override_config.shell.timeout = Some(30);

        base.merge(override_config);

        assert_eq!(base.defaults.output.as_deref(), Some("json"));
        assert_eq!(base.shell.timeout(), 30);
        // Unset in the override, so the base value survives
        assert_eq!(base.shell.command_wrapper.as_deref(), Some("nix-shell --run"));
    }

    #[test]
    fn test_later_layer_can_reset_to_defaults() {
        let user: DocflowConfig = toml::from_str(
            "[defaults]\ndry_run = true\nverbose = true\n[shell]\nenabled = true\ntimeout = 60\n",
        )
        .unwrap();
        let project: DocflowConfig = toml::from_str(
            "[defaults]\ndry_run = false\n[shell]\nenabled = false\ntimeout = 300\n",
        )
        .unwrap();

        let mut config = DocflowConfig::default();
        config.merge(user);
        config.merge(project);

        assert!(!config.defaults.dry_run());
        assert!(!config.shell.enabled());
        assert_eq!(config.shell.timeout(), 300);
        // Not mentioned by the project layer
        assert!(config.defaults.verbose());
    }

    #[test]
    fn test_load_workflow_by_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("digest.yaml");
        std::fs::write(
            &path,
            "name: digest\nsteps:\n  - id: a\n    action: text.echo\n",
        )
        .unwrap();

        let workflow = load_workflow(path.to_str().unwrap(), None).unwrap();
        assert_eq!(workflow.name, "digest");
    }

    #[test]
    fn test_load_workflow_by_name_from_project() {
        let dir = TempDir::new().unwrap();
        let workflows = dir.path().join(".docflow/workflows");
        std::fs::create_dir_all(&workflows).unwrap();
        std::fs::write(
            workflows.join("convert.toml"),
            "name = \"convert\"\n[[steps]]\nid = \"a\"\naction = \"text.echo\"\n",
        )
        .unwrap();

        let workflow = load_workflow("convert", Some(dir.path())).unwrap();
        assert_eq!(workflow.name, "convert");
        assert_eq!(workflow.steps.len(), 1);
    }

    #[test]
    fn test_load_workflow_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_workflow("does-not-exist-anywhere", Some(dir.path())).unwrap_err();
        assert!(matches!(err, DefinitionError::NotFound { .. }));
    }

    #[test]
    fn test_load_workflow_file_validates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yml");
        std::fs::write(&path, "name: broken\nsteps: []\n").unwrap();

        assert_eq!(
            load_workflow_file(&path).unwrap_err(),
            DefinitionError::EmptySteps
        );
    }
}
