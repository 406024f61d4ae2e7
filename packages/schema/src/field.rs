//! Field schemas and payload validation

use crate::i18n::{self, FallbackTranslator, Params, Translator};
use blockwork_expression::value::number;
use blockwork_expression::{binding_expression, parse};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    Boolean,
    Enum(Vec<String>),
    Array {
        item: Box<FieldSchema>,
        min_items: usize,
    },
    Object(ObjectSchema),
    /// A binding expression, with or without `{{ }}`
    Expression,
    Url,
    Any,
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            FieldKind::String { .. } | FieldKind::Enum(_) | FieldKind::Expression | FieldKind::Url => {
                "text"
            }
            FieldKind::Number { integer: true, .. } => "integer",
            FieldKind::Number { .. } => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array { .. } => "list",
            FieldKind::Object(_) => "object",
            FieldKind::Any => "any",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl FieldSchema {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String {
            min_len: None,
            max_len: None,
        })
    }

    pub fn number() -> Self {
        Self::new(FieldKind::Number {
            min: None,
            max: None,
            integer: false,
        })
    }

    pub fn integer(min: i64, max: i64) -> Self {
        Self::new(FieldKind::Number {
            min: Some(min as f64),
            max: Some(max as f64),
            integer: true,
        })
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn one_of(values: &[&str]) -> Self {
        Self::new(FieldKind::Enum(values.iter().map(|v| v.to_string()).collect()))
    }

    pub fn array(item: FieldSchema) -> Self {
        Self::new(FieldKind::Array {
            item: Box::new(item),
            min_items: 0,
        })
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Self::new(FieldKind::Object(schema))
    }

    pub fn expression() -> Self {
        Self::new(FieldKind::Expression)
    }

    pub fn url() -> Self {
        Self::new(FieldKind::Url)
    }

    pub fn any() -> Self {
        Self::new(FieldKind::Any)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        if let FieldKind::String { min_len, .. } = &mut self.kind {
            *min_len = Some(len);
        }
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        if let FieldKind::String { max_len, .. } = &mut self.kind {
            *max_len = Some(len);
        }
        self
    }

    pub fn min_items(mut self, count: usize) -> Self {
        if let FieldKind::Array { min_items, .. } = &mut self.kind {
            *min_items = count;
        }
        self
    }

    pub fn validate(&self, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
        match (&self.kind, value) {
            (_, Value::Null) if !self.required => {}
            (FieldKind::Any, _) => {}

            (FieldKind::String { min_len, max_len }, Value::String(s)) => {
                let len = s.chars().count();
                if let Some(min) = min_len.filter(|min| len < *min) {
                    errors.push(FieldError::new(path, "validation.min-length").param("min", min));
                }
                if let Some(max) = max_len.filter(|max| len > *max) {
                    errors.push(FieldError::new(path, "validation.max-length").param("max", max));
                }
            }

            (FieldKind::Number { min, max, integer }, Value::Number(n)) => {
                let n = n.as_f64().unwrap_or(0.0);
                if *integer && n.fract() != 0.0 {
                    errors.push(FieldError::new(path, "validation.integer"));
                }
                if let Some(min) = min.filter(|min| n < *min) {
                    errors.push(FieldError::new(path, "validation.min").param("min", number(min)));
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    errors.push(FieldError::new(path, "validation.max").param("max", number(max)));
                }
            }

            (FieldKind::Boolean, Value::Bool(_)) => {}

            (FieldKind::Enum(allowed), Value::String(s)) => {
                if !allowed.contains(s) {
                    errors.push(
                        FieldError::new(path, "validation.enum").param("allowed", allowed.join(", ")),
                    );
                }
            }

            (FieldKind::Array { item, min_items }, Value::Array(items)) => {
                if items.len() < *min_items {
                    errors.push(FieldError::new(path, "validation.min-items").param("min", *min_items));
                }
                for (index, value) in items.iter().enumerate() {
                    item.validate(value, &format!("{}[{}]", path, index), errors);
                }
            }

            (FieldKind::Object(schema), Value::Object(map)) => schema.validate_at(map, path, errors),

            (FieldKind::Expression, Value::String(s)) => {
                let source = binding_expression(s);
                if !source.trim().is_empty() {
                    if let Err(e) = parse(source) {
                        errors.push(
                            FieldError::new(path, "validation.invalid-expression")
                                .param("error", e.to_string()),
                        );
                    }
                }
            }

            (FieldKind::Url, Value::String(s)) => {
                if !is_allowed_url(s) {
                    errors.push(FieldError::new(path, "validation.invalid-url").param("url", s.as_str()));
                }
            }

            (kind, _) => {
                let key = if value.is_null() {
                    "validation.required"
                } else {
                    "validation.type"
                };
                errors.push(FieldError::new(path, key).param("expected", kind.expected()));
            }
        }
    }
}

/// Links may be relative, anchors, bindings, or use a known scheme.
pub fn is_allowed_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || url.contains("{{") {
        return true;
    }
    match url.find(':') {
        Some(colon) if !url[..colon].contains('/') && !url[..colon].contains('?') => {
            let scheme = url[..colon].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel")
        }
        _ => true,
    }
}

/// Schema of a property bag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub fields: BTreeMap<String, FieldSchema>,
    pub allow_unknown: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.insert(name.into(), schema);
        self
    }

    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    /// Object made of every field default
    pub fn default_value(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|(name, field)| {
                let value = match (&field.default, &field.kind) {
                    (Some(value), _) => value.clone(),
                    (None, FieldKind::Object(nested)) if field.required => {
                        Value::Object(nested.default_value())
                    }
                    _ => return None,
                };
                Some((name.clone(), value))
            })
            .collect()
    }

    pub fn validate(&self, value: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        self.validate_at(value, "", &mut errors);
        ValidationErrors::result(errors)
    }

    pub fn validate_at(&self, value: &Map<String, Value>, path: &str, errors: &mut Vec<FieldError>) {
        for (name, field) in &self.fields {
            let field_path = join_path(path, name);
            match value.get(name) {
                Some(v) => field.validate(v, &field_path, errors),
                None if field.required => errors.push(FieldError::new(&field_path, "validation.required")),
                None => {}
            }
        }

        if !self.allow_unknown {
            for name in value.keys().filter(|name| !self.fields.contains_key(*name)) {
                errors.push(FieldError::new(&join_path(path, name), "validation.unknown-field"));
            }
        }
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

/// One failed check, addressed by field path and translation key
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub path: String,
    pub key: String,
    pub params: Params,
}

impl FieldError {
    pub fn new(path: &str, key: &str) -> Self {
        Self {
            path: path.to_string(),
            key: i18n::key(key),
            params: Params::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn message(&self) -> String {
        self.message_with(&FallbackTranslator)
    }

    pub fn message_with(&self, translator: &dyn Translator) -> String {
        translator.translate(&self.key, &self.params)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message())
        } else {
            write!(f, "{}: {}", self.path, self.message())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Default)]
#[error("{} validation error(s): {}", .0.len(), summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn result(errors: Vec<FieldError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors at `path` or below it
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| {
            e.path == path
                || e.path
                    .strip_prefix(path)
                    .map_or(false, |rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|e| json!({ "path": e.path, "key": e.key, "message": e.message() }))
                .collect(),
        )
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn heading() -> ObjectSchema {
        ObjectSchema::new()
            .field("level", FieldSchema::integer(1, 6).required().with_default(2))
            .field("content", FieldSchema::string().with_default("Heading"))
    }

    #[test]
    fn test_defaults_validate() {
        let schema = heading();
        let value = schema.default_value();
        assert_eq!(Value::Object(value.clone()), json!({ "level": 2, "content": "Heading" }));
        assert!(schema.validate(&value).is_ok());
    }

    #[test]
    fn test_level_out_of_range() {
        let errors = heading().validate(&props(json!({ "level": 9 }))).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].path, "level");
        assert_eq!(errors.0[0].key, "builder.validation.max");
        assert_eq!(errors.0[0].message(), "Must be at most 6");
    }

    #[test]
    fn test_required_and_type_errors() {
        let errors = heading()
            .validate(&props(json!({ "content": 3, "extra": true })))
            .unwrap_err();
        let keys: Vec<_> = errors.iter().map(|e| (e.path.as_str(), e.key.as_str())).collect();
        assert_eq!(
            keys,
            vec![
                ("content", "builder.validation.type"),
                ("level", "builder.validation.required"),
                ("extra", "builder.validation.unknown-field"),
            ]
        );
    }

    #[test]
    fn test_nested_paths() {
        let schema = ObjectSchema::new().field(
            "items",
            FieldSchema::array(FieldSchema::object(
                ObjectSchema::new().field("name", FieldSchema::string().min_len(1).required()),
            )),
        );
        let errors = schema
            .validate(&props(json!({ "items": [{ "name": "a" }, { "name": "b" }, { "name": "" }] })))
            .unwrap_err();
        assert_eq!(errors.0[0].path, "items[2].name");
        assert_eq!(errors.for_path("items").count(), 1);
        assert_eq!(errors.for_path("item").count(), 0);
    }

    #[test]
    fn test_expression_fields() {
        let schema = ObjectSchema::new().field("condition", FieldSchema::expression());
        assert!(schema.validate(&props(json!({ "condition": "{{ user.age >= 18 }}" }))).is_ok());
        assert!(schema.validate(&props(json!({ "condition": "" }))).is_ok());
        let errors = schema.validate(&props(json!({ "condition": "a &&" }))).unwrap_err();
        assert_eq!(errors.0[0].key, "builder.validation.invalid-expression");
    }

    #[test]
    fn test_url_schemes() {
        assert!(is_allowed_url("https://example.com"));
        assert!(is_allowed_url("/about"));
        assert!(is_allowed_url("#top"));
        assert!(is_allowed_url("mailto:hi@example.com"));
        assert!(is_allowed_url("/search?q=a:b"));
        assert!(is_allowed_url("{{ link }}"));
        assert!(!is_allowed_url("javascript:alert(1)"));
        assert!(!is_allowed_url(" JavaScript:alert(1)"));
    }

    #[test]
    fn test_enum() {
        let schema = ObjectSchema::new().field("variant", FieldSchema::one_of(&["primary", "outline"]));
        let errors = schema.validate(&props(json!({ "variant": "loud" }))).unwrap_err();
        assert_eq!(errors.0[0].message(), "Must be one of: primary, outline");
    }
}
