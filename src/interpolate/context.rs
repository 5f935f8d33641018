//! Read-only context for placeholder resolution

use crate::workflow::StepResult;
use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Source of environment variables for `env.<NAME>` placeholders
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Everything a placeholder may read: results of steps that already ran,
/// the wall-clock time captured when the context was built, and the
/// environment.
pub struct InterpolationContext<'a> {
    steps: &'a HashMap<String, StepResult>,
    env: &'a dyn EnvSource,
    now: DateTime<Local>,
}

impl<'a> InterpolationContext<'a> {
    pub fn new(steps: &'a HashMap<String, StepResult>, env: &'a dyn EnvSource) -> Self {
        Self {
            steps,
            env,
            now: Local::now(),
        }
    }

    /// Pin the clock, mainly for tests
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// Output recorded for a step, if it has run
    pub fn step_output(&self, id: &str) -> Option<&str> {
        self.steps.get(id).map(|r| r.output.as_str())
    }

    pub fn env_var(&self, name: &str) -> Option<String> {
        self.env.var(name)
    }

    pub fn now(&self) -> DateTime<Local> {
        self.now
    }
}
