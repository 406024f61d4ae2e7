//! Capability tags and insertion predicates

use blockwork_model::BlockKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a block type is, as far as placement rules care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Inline,
    Layout,
    Form,
    FormField,
    AccordionItem,
    /// Introduces bindings for its children
    Scoping,
    /// Leaves the normal page flow (redirects, raw markup)
    Escape,
    Media,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Inline => "inline",
            Capability::Layout => "layout",
            Capability::Form => "form",
            Capability::FormField => "form-field",
            Capability::AccordionItem => "accordion-item",
            Capability::Scoping => "scoping",
            Capability::Escape => "escape",
            Capability::Media => "media",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which child types a slot accepts
#[derive(Debug, Clone, PartialEq)]
pub enum AllowPredicate {
    Any,
    Capability(Capability),
    Kinds(Vec<BlockKind>),
    Not(Box<AllowPredicate>),
    All(Vec<AllowPredicate>),
    AnyOf(Vec<AllowPredicate>),
}

impl AllowPredicate {
    pub fn kinds(kinds: impl IntoIterator<Item = BlockKind>) -> Self {
        AllowPredicate::Kinds(kinds.into_iter().collect())
    }

    pub fn not(predicate: AllowPredicate) -> Self {
        AllowPredicate::Not(Box::new(predicate))
    }

    pub fn accepts(&self, kind: &BlockKind, capabilities: &[Capability]) -> bool {
        match self {
            AllowPredicate::Any => true,
            AllowPredicate::Capability(c) => capabilities.contains(c),
            AllowPredicate::Kinds(kinds) => kinds.contains(kind),
            AllowPredicate::Not(inner) => !inner.accepts(kind, capabilities),
            AllowPredicate::All(all) => all.iter().all(|p| p.accepts(kind, capabilities)),
            AllowPredicate::AnyOf(any) => any.iter().any(|p| p.accepts(kind, capabilities)),
        }
    }
}

impl Default for AllowPredicate {
    fn default() -> Self {
        AllowPredicate::Any
    }
}

/// A named child slot and what it accepts
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    pub name: String,
    pub allow: AllowPredicate,
}

impl SlotSpec {
    pub fn new(name: impl Into<String>, allow: AllowPredicate) -> Self {
        Self {
            name: name.into(),
            allow,
        }
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, AllowPredicate::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let item = [Capability::AccordionItem];
        let layout = [Capability::Layout];

        let only_items = AllowPredicate::Capability(Capability::AccordionItem);
        assert!(only_items.accepts(&BlockKind::AccordionItem, &item));
        assert!(!only_items.accepts(&BlockKind::Container, &layout));

        let no_escape = AllowPredicate::All(vec![
            AllowPredicate::Any,
            AllowPredicate::not(AllowPredicate::Capability(Capability::Escape)),
        ]);
        assert!(no_escape.accepts(&BlockKind::Container, &layout));
        assert!(!no_escape.accepts(&BlockKind::Redirect, &[Capability::Escape]));

        let columns = AllowPredicate::AnyOf(vec![
            AllowPredicate::kinds([BlockKind::Column]),
            AllowPredicate::Capability(Capability::Media),
        ]);
        assert!(columns.accepts(&BlockKind::Column, &layout));
        assert!(!columns.accepts(&BlockKind::Text, &[]));
    }

    #[test]
    fn test_capability_serde() {
        assert_eq!(serde_json::to_string(&Capability::FormField).unwrap(), "\"form-field\"");
        assert_eq!(Capability::AccordionItem.to_string(), "accordion-item");
    }
}
