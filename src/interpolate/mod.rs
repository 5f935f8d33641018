//! Placeholder interpolation for step fields
//!
//! Step fields may contain `${{ expr }}` placeholders. Four expression forms
//! are recognized:
//!
//! - `steps.<id>.output` - output of an earlier step (empty if it has not run)
//! - `date.today` - current date as `YYYY-MM-DD`
//! - `date.now` / `date.timestamp` - current time in RFC 3339
//! - `env.<NAME>` - environment variable (empty if unset)
//!
//! Anything else is left in place, delimiters included.
//!
//! # Example
//!
//! ```ignore
//! use docflow::interpolate::{InterpolationContext, ProcessEnv, interpolate};
//!
//! let results = HashMap::new();
//! let ctx = InterpolationContext::new(&results, &ProcessEnv);
//! let subject = interpolate("Digest for ${{ date.today }}", &ctx);
//! ```

mod context;
mod engine;
mod references;

pub use context::{EnvSource, InterpolationContext, ProcessEnv};
pub use engine::{extract_expressions, interpolate, resolve_expression, resolve_step};
pub use references::{
    ReferenceIssue, ReferenceKind, check_references, extract_references, interpolatable_fields,
};
