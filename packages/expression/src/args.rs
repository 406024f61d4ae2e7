//! Runtime arguments context.
//!
//! `Args` is a persistent chain of binding frames. Scoping blocks call
//! [`Args::extend`] to obtain a child context; the parent is never mutated, so
//! siblings rendered after a loop still see the original bindings.

use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
struct Frame {
    bindings: Map<String, Value>,
    parent: Option<Arc<Frame>>,
}

/// Variable bindings visible to binding expressions during one render pass
#[derive(Debug, Clone, Default)]
pub struct Args {
    head: Option<Arc<Frame>>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root context from a JSON object. Non-object values yield an empty context.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(bindings) => Self::from_map(bindings),
            Value::Null => Self::new(),
            other => {
                tracing::warn!(value = %other, "Runtime arguments must be an object; ignoring");
                Self::new()
            }
        }
    }

    pub fn from_map(bindings: Map<String, Value>) -> Self {
        Self::new().extend_many(bindings)
    }

    /// New context with `name` bound to `value`, shadowing outer bindings
    pub fn extend(&self, name: impl Into<String>, value: Value) -> Self {
        let mut bindings = Map::new();
        bindings.insert(name.into(), value);
        self.extend_many(bindings)
    }

    pub fn extend_many(&self, bindings: Map<String, Value>) -> Self {
        if bindings.is_empty() {
            return self.clone();
        }
        Self {
            head: Some(Arc::new(Frame {
                bindings,
                parent: self.head.clone(),
            })),
        }
    }

    /// Innermost binding for `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            if let Some(value) = current.bindings.get(name) {
                return Some(value);
            }
            frame = current.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Flatten every visible binding into one object (inner frames win)
    pub fn to_value(&self) -> Value {
        let mut frames = Vec::new();
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            frames.push(current);
            frame = current.parent.as_deref();
        }

        let mut merged = Map::new();
        for current in frames.into_iter().rev() {
            for (key, value) in &current.bindings {
                merged.insert(key.clone(), value.clone());
            }
        }
        Value::Object(merged)
    }
}
