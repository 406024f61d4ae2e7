//! Translation seam
//!
//! User-facing text is never hard-coded in the engine. Every label,
//! placeholder and error message is produced through a [`Translator`] from a
//! dotted key under the `builder.` namespace.

use serde_json::Value;
use std::collections::BTreeMap;

/// Namespace prefix of every key the engine emits
pub const NAMESPACE: &str = "builder";

/// Named parameters substituted into a translated string
pub type Params = BTreeMap<String, Value>;

/// Qualify a key with the engine namespace
pub fn key(suffix: &str) -> String {
    format!("{}.{}", NAMESPACE, suffix)
}

pub trait Translator {
    fn translate(&self, key: &str, params: &Params) -> String;
}

/// English strings for every key the engine emits. Unknown keys are echoed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTranslator;

impl FallbackTranslator {
    fn template(key: &str) -> Option<&'static str> {
        let suffix = key.strip_prefix(NAMESPACE)?.strip_prefix('.')?;
        let template = match suffix {
            "validation.required" => "This field is required",
            "validation.type" => "Expected {expected}",
            "validation.min-length" => "Must be at least {min} characters",
            "validation.max-length" => "Must be at most {max} characters",
            "validation.min" => "Must be at least {min}",
            "validation.max" => "Must be at most {max}",
            "validation.integer" => "Must be a whole number",
            "validation.enum" => "Must be one of: {allowed}",
            "validation.min-items" => "Needs at least {min} items",
            "validation.unknown-field" => "Unknown field",
            "validation.invalid-expression" => "Invalid expression: {error}",
            "validation.invalid-url" => "Not an allowed link: {url}",
            "validation.unknown-type" => "Unknown block type {type}",
            "validation.placement" => "{reason}",
            "insert.unknown-parent" => "Unknown container type {parent}",
            "insert.unknown-child" => "Unknown block type {child}",
            "insert.no-such-slot" => "{parent} has no slot named {slot}",
            "insert.slot-disallows" => "{child} cannot be placed in this {parent}",
            "insert.parent-disallowed" => "{child} can only be placed inside {allowed}",
            "placeholder.missing-block" => "Missing block: {type}",
            "placeholder.redirect" => "Redirects to {url}",
            "placeholder.redirect-unset" => "Redirect without a target",
            "placeholder.form-unlinked" => "No form selected",
            "placeholder.form-not-found" => "Form {formId} not found",
            "placeholder.form-failed" => "Form {formId} failed to load",
            "placeholder.raw-html" => "Custom HTML",
            "placeholder.empty-slot" => "Drop blocks here",
            _ => return None,
        };
        Some(template)
    }
}

impl Translator for FallbackTranslator {
    fn translate(&self, key: &str, params: &Params) -> String {
        if let Some(block) = key.strip_prefix("builder.blocks.") {
            return block.to_string();
        }
        match Self::template(key) {
            Some(template) => substitute(template, params),
            None => key.to_string(),
        }
    }
}

/// Replace `{name}` placeholders with parameter values
pub fn substitute(template: &str, params: &Params) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&format!("{{{}}}", name), &text);
    }
    out
}

/// Convenience for building parameter maps
pub fn params<const N: usize>(pairs: [(&str, Value); N]) -> Params {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_substitutes_params() {
        let text = FallbackTranslator.translate(
            "builder.validation.min",
            &params([("min", json!(1))]),
        );
        assert_eq!(text, "Must be at least 1");
    }

    #[test]
    fn test_unknown_key_is_echoed() {
        assert_eq!(FallbackTranslator.translate("other.thing", &Params::new()), "other.thing");
        assert_eq!(FallbackTranslator.translate("builder.nope", &Params::new()), "builder.nope");
    }

    #[test]
    fn test_block_labels() {
        assert_eq!(FallbackTranslator.translate("builder.blocks.Heading", &Params::new()), "Heading");
    }

    #[test]
    fn test_key_namespace() {
        assert_eq!(key("placeholder.redirect"), "builder.placeholder.redirect");
    }
}
