//! `file.read` and `file.write`

use crate::config::StepDefinition;
use crate::workflow::{Action, ActionContext, ActionError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Expand `~` and resolve relative paths against `base_dir`
fn resolve_path(base_dir: Option<&Path>, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw.trim()).as_ref());
    match base_dir {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    }
}

/// Reads the file named by the effective input
#[derive(Debug, Clone, Default)]
pub struct FileRead {
    base_dir: Option<PathBuf>,
}

impl FileRead {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl Action for FileRead {
    async fn call(
        &self,
        ctx: &ActionContext,
        step: &StepDefinition,
        input: &str,
    ) -> Result<String, ActionError> {
        if input.trim().is_empty() {
            return Err(ActionError::missing_field("input"));
        }
        ctx.check_cancelled()?;

        let path = resolve_path(self.base_dir.as_deref(), input);
        tracing::debug!(step = %step.id, path = %path.display(), "Reading file");
        tokio::fs::read_to_string(&path).await.map_err(|e| ActionError::Io {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Writes the effective input to the path in `to`
///
/// `options.mode` may be `append`; anything else overwrites.
#[derive(Debug, Clone, Default)]
pub struct FileWrite {
    base_dir: Option<PathBuf>,
}

impl FileWrite {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl Action for FileWrite {
    async fn call(
        &self,
        ctx: &ActionContext,
        step: &StepDefinition,
        input: &str,
    ) -> Result<String, ActionError> {
        if step.to.trim().is_empty() {
            return Err(ActionError::missing_field("to"));
        }
        ctx.check_cancelled()?;

        let path = resolve_path(self.base_dir.as_deref(), &step.to);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        if step.option("mode") == Some("append") {
            use tokio::io::AsyncWriteExt;
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(input.as_bytes()).await?;
            file.flush().await?;
        } else {
            tokio::fs::write(&path, input).await?;
        }

        tracing::debug!(step = %step.id, path = %path.display(), bytes = input.len(), "Wrote file");
        Ok(path.display().to_string())
    }
}
