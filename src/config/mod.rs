//! Configuration types and loading for docflow

mod error;
mod loader;
mod workflow;

pub use error::DefinitionError;
pub use loader::{
    Defaults, DocflowConfig, FilesConfig, ShellConfig, load_workflow, load_workflow_file,
};
pub use workflow::{OnFailure, StepDefinition, WorkflowDefinition};
