//! Placeholder substitution for shell templates.
//!
//! Templates use `{{ name }}` placeholders. Substitution is the only supported
//! construct; anything else between double braces is rejected.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::RenderError;
use crate::expand::Assignment;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid"))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Names referenced by a template, in order of first appearance.
pub fn placeholders(template: &str) -> Result<Vec<String>, RenderError> {
    let mut names: Vec<String> = Vec::new();
    for captures in placeholder_pattern().captures_iter(template) {
        let name = placeholder_name(&captures)?;
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Substitute every placeholder with the bound value's display form.
pub fn render(template: &str, assignment: &Assignment) -> Result<String, RenderError> {
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;

    for captures in placeholder_pattern().captures_iter(template) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let name = placeholder_name(&captures)?;
        let value = assignment
            .get(name)
            .ok_or_else(|| RenderError::UnboundName {
                name: name.to_string(),
            })?;

        rendered.push_str(&template[last..whole.start()]);
        rendered.push_str(&value.to_string());
        last = whole.end();
    }

    rendered.push_str(&template[last..]);
    Ok(rendered)
}

fn placeholder_name<'t>(captures: &Captures<'t>) -> Result<&'t str, RenderError> {
    let body = captures.get(1).map_or("", |m| m.as_str());
    let name = body.trim();
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(RenderError::UnsupportedExpression {
            expression: body.trim().to_string(),
        })
    }
}
