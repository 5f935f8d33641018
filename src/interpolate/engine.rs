//! `${{ expr }}` placeholder substitution

use super::context::InterpolationContext;
use crate::config::StepDefinition;
use chrono::SecondsFormat;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `${{`, anything but `}`, then `}}`. Placeholders never nest.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\{([^}]*)\}\}").unwrap());

/// Replace every well-formed placeholder in `text`.
///
/// Unrecognized expressions are kept verbatim, delimiters included, and
/// unterminated placeholders are left alone.
///
/// ```ignore
/// let out = interpolate("Report for ${{ date.today }}", &ctx);
/// assert!(out.starts_with("Report for 20"));
/// ```
pub fn interpolate(text: &str, ctx: &InterpolationContext<'_>) -> String {
    if !text.contains("${{") {
        return text.to_string();
    }

    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            resolve_expression(caps[1].trim(), ctx).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Resolve a single trimmed expression, or `None` if it is not recognized
pub fn resolve_expression(expr: &str, ctx: &InterpolationContext<'_>) -> Option<String> {
    match expr {
        "date.today" => Some(ctx.now().format("%Y-%m-%d").to_string()),
        "date.now" | "date.timestamp" => {
            Some(ctx.now().to_rfc3339_opts(SecondsFormat::Secs, false))
        }
        _ => {
            if let Some(id) = step_reference(expr) {
                // Steps that have not run yet resolve to nothing
                return Some(ctx.step_output(id).unwrap_or_default().to_string());
            }
            if let Some(name) = expr.strip_prefix("env.") {
                return Some(ctx.env_var(name).unwrap_or_default());
            }
            None
        }
    }
}

/// The step id in a `steps.<id>.output` expression
pub(crate) fn step_reference(expr: &str) -> Option<&str> {
    expr.strip_prefix("steps.")?.strip_suffix(".output")
}

/// Produce a copy of `step` with every interpolatable field resolved.
/// The id, action and failure policy are copied unchanged.
pub fn resolve_step(step: &StepDefinition, ctx: &InterpolationContext<'_>) -> StepDefinition {
    StepDefinition {
        id: step.id.clone(),
        action: step.action.clone(),
        input: interpolate(&step.input, ctx),
        template: interpolate(&step.template, ctx),
        data: interpolate(&step.data, ctx),
        options: step
            .options
            .iter()
            .map(|(k, v)| (k.clone(), interpolate(v, ctx)))
            .collect(),
        to: interpolate(&step.to, ctx),
        subject: interpolate(&step.subject, ctx),
        attach: interpolate(&step.attach, ctx),
        on_failure: step.on_failure,
    }
}

/// Every `${{ ... }}` expression in `text`, trimmed, in order of appearance
pub fn extract_expressions(text: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect()
}
