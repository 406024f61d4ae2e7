use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Responsive breakpoint, ordered from narrowest to widest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Sm,
    Md,
    Lg,
    Xl,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 4] = [Breakpoint::Sm, Breakpoint::Md, Breakpoint::Lg, Breakpoint::Xl];

    pub fn min_width(&self) -> u32 {
        match self {
            Breakpoint::Sm => 640,
            Breakpoint::Md => 768,
            Breakpoint::Lg => 1024,
            Breakpoint::Xl => 1280,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sm" => Some(Breakpoint::Sm),
            "md" => Some(Breakpoint::Md),
            "lg" => Some(Breakpoint::Lg),
            "xl" => Some(Breakpoint::Xl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
        }
    }

    /// Widest breakpoint active at the given viewport width
    pub fn for_width(width: u32) -> Option<Self> {
        Self::ALL.into_iter().rev().find(|bp| width >= bp.min_width())
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction state qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleState {
    Hover,
    Focus,
    Active,
}

impl StyleState {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "hover" => Some(StyleState::Hover),
            "focus" => Some(StyleState::Focus),
            "active" => Some(StyleState::Active),
            _ => None,
        }
    }

    pub fn pseudo_class(&self) -> &'static str {
        match self {
            StyleState::Hover => ":hover",
            StyleState::Focus => ":focus",
            StyleState::Active => ":active",
        }
    }
}

/// One conditional value for a style property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDeclaration {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<Breakpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StyleState>,
}

impl StyleDeclaration {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            breakpoint: None,
            state: None,
        }
    }

    pub fn at(mut self, breakpoint: Breakpoint) -> Self {
        self.breakpoint = Some(breakpoint);
        self
    }

    pub fn on(mut self, state: StyleState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn is_unqualified(&self) -> bool {
        self.breakpoint.is_none() && self.state.is_none()
    }

    /// Tolerant conversion from stored JSON; unusable entries yield `None`
    fn from_json(property: &str, value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::new(s.clone())),
            Value::Number(n) => Some(Self::new(n.to_string())),
            Value::Bool(b) => Some(Self::new(b.to_string())),
            Value::Object(map) => {
                let value = match map.get("value")? {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                let breakpoint = match map.get("breakpoint").and_then(Value::as_str) {
                    Some(name) => match Breakpoint::parse(name) {
                        Some(bp) => Some(bp),
                        None => {
                            warn!(property, breakpoint = name, "Unknown breakpoint; dropping declaration");
                            return None;
                        }
                    },
                    None => None,
                };
                let state = match map.get("state").and_then(Value::as_str) {
                    Some(name) => match StyleState::parse(name) {
                        Some(state) => Some(state),
                        None => {
                            warn!(property, state = name, "Unknown style state; dropping declaration");
                            return None;
                        }
                    },
                    None => None,
                };
                Some(Self {
                    value,
                    breakpoint,
                    state,
                })
            }
            Value::Null | Value::Array(_) => None,
        }
    }
}

/// Declared styles of a block: property → declarations in ascending priority
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    properties: BTreeMap<String, Vec<StyleDeclaration>>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all declarations of `property` with one unqualified value
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties
            .insert(property.into(), vec![StyleDeclaration::new(value)]);
    }

    /// Builder form of [`StyleMap::set`]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Append a declaration with the highest priority so far
    pub fn push(&mut self, property: impl Into<String>, declaration: StyleDeclaration) {
        self.properties
            .entry(property.into())
            .or_default()
            .push(declaration);
    }

    pub fn remove(&mut self, property: &str) -> Option<Vec<StyleDeclaration>> {
        self.properties.remove(property)
    }

    pub fn get(&self, property: &str) -> &[StyleDeclaration] {
        self.properties
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[StyleDeclaration])> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Tolerant conversion: non-object input and unusable entries are dropped
    pub fn from_json(value: &Value) -> Self {
        let mut map = Self::new();
        let Value::Object(entries) = value else {
            if !value.is_null() {
                warn!("Style map is not an object; ignoring");
            }
            return map;
        };

        for (property, raw) in entries {
            let declarations: Vec<_> = match raw {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| StyleDeclaration::from_json(property, item))
                    .collect(),
                single => StyleDeclaration::from_json(property, single)
                    .into_iter()
                    .collect(),
            };
            if !declarations.is_empty() {
                map.properties.insert(property.clone(), declarations);
            }
        }

        map
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for (property, declarations) in &self.properties {
            match declarations.as_slice() {
                [only] if only.is_unqualified() => map.serialize_entry(property, &only.value)?,
                many => map.serialize_entry(property, many)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}
