// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stepline contributors

//! Template pass over the substituted document

use base64::Engine;
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperResult, Output, RenderContext,
    RenderError,
};
use serde_json::Value;

use crate::errors::SteplineResult;

handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(lower: |s: str| s.to_lowercase());
handlebars_helper!(trim: |s: str| s.trim().to_string());
// JSON string syntax is also a valid YAML double-quoted scalar
handlebars_helper!(quote: |s: str| Value::String(s.to_string()).to_string());
handlebars_helper!(replace: |old: str, new: str, s: str| s.replace(old, new));
handlebars_helper!(trim_prefix: |prefix: str, s: str| s.strip_prefix(prefix).unwrap_or(s).to_string());
handlebars_helper!(trim_suffix: |suffix: str, s: str| s.strip_suffix(suffix).unwrap_or(s).to_string());
handlebars_helper!(contains: |substr: str, s: str| s.contains(substr));
handlebars_helper!(has_prefix: |prefix: str, s: str| s.starts_with(prefix));
handlebars_helper!(has_suffix: |suffix: str, s: str| s.ends_with(suffix));
handlebars_helper!(repeat: |count: u64, s: str| s.repeat(count as usize));
handlebars_helper!(split: |sep: str, s: str| {
    Value::Array(s.split(sep).map(|part| Value::String(part.to_string())).collect())
});
handlebars_helper!(join: |sep: str, items: Json| {
    match items {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(sep),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
});
handlebars_helper!(b64enc: |s: str| base64::engine::general_purpose::STANDARD.encode(s.as_bytes()));
handlebars_helper!(default_value: |fallback: Json, value: Json| {
    match value {
        Value::Null => fallback.clone(),
        Value::String(s) if s.is_empty() => fallback.clone(),
        other => other.clone(),
    }
});

fn b64dec(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("b64dec expects a string"))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| RenderError::new(format!("b64dec: {}", e)))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|_| RenderError::new("b64dec: decoded value is not UTF-8"))?;

    out.write(&decoded)?;
    Ok(())
}

/// Renders the template language used inside pipeline documents
///
/// There is no data context: environment access goes through variable
/// substitution only.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("upper", Box::new(upper));
        handlebars.register_helper("lower", Box::new(lower));
        handlebars.register_helper("trim", Box::new(trim));
        handlebars.register_helper("quote", Box::new(quote));
        handlebars.register_helper("replace", Box::new(replace));
        handlebars.register_helper("default", Box::new(default_value));
        handlebars.register_helper("trimPrefix", Box::new(trim_prefix));
        handlebars.register_helper("trimSuffix", Box::new(trim_suffix));
        handlebars.register_helper("contains", Box::new(contains));
        handlebars.register_helper("hasPrefix", Box::new(has_prefix));
        handlebars.register_helper("hasSuffix", Box::new(has_suffix));
        handlebars.register_helper("repeat", Box::new(repeat));
        handlebars.register_helper("split", Box::new(split));
        handlebars.register_helper("join", Box::new(join));
        handlebars.register_helper("b64enc", Box::new(b64enc));
        handlebars.register_helper("b64dec", Box::new(b64dec));

        Self { handlebars }
    }

    /// Render a document
    pub fn render(&self, source: &str) -> SteplineResult<String> {
        Ok(self.handlebars.render_template(source, &Value::Null)?)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
