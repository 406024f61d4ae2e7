//! Schema registry
//!
//! Built once at startup and passed by reference to the renderer and the
//! editor. Lookups are by block type name.

use crate::capability::{Capability, SlotSpec};
use crate::field::{FieldError, ObjectSchema, ValidationErrors};
use crate::i18n::{self, params, FallbackTranslator, Params, Translator};
use blockwork_model::{BlockData, BlockKind, BlockNode, IdGenerator, Props, Visitor, walk_block};
use blockwork_style::{StyleDefaults, StyleMap};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Computes a type's default style from its props, style and mode
pub type DefaultStyleFn = fn(&Props, &StyleMap, bool) -> StyleDefaults;

fn no_default_styles(_: &Props, _: &StyleMap, _: bool) -> StyleDefaults {
    StyleDefaults::new()
}

/// Everything the engine knows about one block type
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub kind: BlockKind,
    pub data_schema: ObjectSchema,
    pub default_style: StyleMap,
    /// Parent types this block may be placed in; `None` means anywhere
    pub allowed_parents: Option<Vec<BlockKind>>,
    pub capabilities: Vec<Capability>,
    pub slots: Vec<SlotSpec>,
    pub default_styles: DefaultStyleFn,
}

impl SchemaEntry {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            data_schema: ObjectSchema::new(),
            default_style: StyleMap::new(),
            allowed_parents: None,
            capabilities: Vec::new(),
            slots: Vec::new(),
            default_styles: no_default_styles,
        }
    }

    pub fn schema(mut self, schema: ObjectSchema) -> Self {
        self.data_schema = schema;
        self
    }

    pub fn style(mut self, style: StyleMap) -> Self {
        self.default_style = style;
        self
    }

    pub fn parents(mut self, parents: impl IntoIterator<Item = BlockKind>) -> Self {
        self.allowed_parents = Some(parents.into_iter().collect());
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn slot(mut self, slot: SlotSpec) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn default_styles(mut self, f: DefaultStyleFn) -> Self {
        self.default_styles = f;
        self
    }

    pub fn type_name(&self) -> &str {
        self.kind.as_str()
    }

    /// Translation key of the type's display label
    pub fn label_key(&self) -> String {
        i18n::key(&format!("blocks.{}", self.kind))
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn slot_spec(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn default_value(&self) -> BlockData {
        BlockData {
            props: self.data_schema.default_value(),
            style: self.default_style.clone(),
        }
    }

    pub fn validate(&self, data: &BlockData) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        self.data_schema.validate_at(&data.props, "props", &mut errors);
        ValidationErrors::result(errors)
    }

    /// Machine-readable summary, used by tooling
    pub fn describe(&self) -> Value {
        json!({
            "type": self.type_name(),
            "capabilities": self.capabilities,
            "allowedParents": self.allowed_parents.as_ref().map(|p| p.iter().map(|k| k.as_str()).collect::<Vec<_>>()),
            "slots": self.slots.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "default": serde_json::to_value(self.default_value()).unwrap_or(Value::Null),
        })
    }
}

/// Why a block cannot go where it was dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertRejection {
    #[error("Unknown parent type: {0}")]
    UnknownParent(String),

    #[error("Unknown block type: {0}")]
    UnknownChild(String),

    #[error("{parent} has no slot '{slot}'")]
    NoSuchSlot { parent: String, slot: String },

    #[error("Slot '{slot}' of {parent} does not accept {child}")]
    SlotDisallows {
        parent: String,
        slot: String,
        child: String,
    },

    #[error("{child} can only be placed inside {allowed}")]
    ParentDisallowed { child: String, allowed: String },
}

impl InsertRejection {
    pub fn key(&self) -> String {
        let suffix = match self {
            InsertRejection::UnknownParent(_) => "insert.unknown-parent",
            InsertRejection::UnknownChild(_) => "insert.unknown-child",
            InsertRejection::NoSuchSlot { .. } => "insert.no-such-slot",
            InsertRejection::SlotDisallows { .. } => "insert.slot-disallows",
            InsertRejection::ParentDisallowed { .. } => "insert.parent-disallowed",
        };
        i18n::key(suffix)
    }

    pub fn params(&self) -> Params {
        match self {
            InsertRejection::UnknownParent(parent) => params([("parent", json!(parent))]),
            InsertRejection::UnknownChild(child) => params([("child", json!(child))]),
            InsertRejection::NoSuchSlot { parent, slot } => {
                params([("parent", json!(parent)), ("slot", json!(slot))])
            }
            InsertRejection::SlotDisallows { parent, slot, child } => params([
                ("parent", json!(parent)),
                ("slot", json!(slot)),
                ("child", json!(child)),
            ]),
            InsertRejection::ParentDisallowed { child, allowed } => {
                params([("child", json!(child)), ("allowed", json!(allowed))])
            }
        }
    }

    pub fn message_with(&self, translator: &dyn Translator) -> String {
        translator.translate(&self.key(), &self.params())
    }
}

/// Validation problems of one block in a tree
#[derive(Debug, Clone, PartialEq)]
pub struct BlockIssue {
    pub block_id: String,
    pub block_type: String,
    pub errors: ValidationErrors,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: BTreeMap<String, SchemaEntry>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in block set
    pub fn builtin() -> Self {
        crate::builtin::builtin_entries()
            .into_iter()
            .fold(Self::new(), Self::register)
    }

    pub fn register(mut self, entry: SchemaEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn insert(&mut self, entry: SchemaEntry) {
        let name = entry.type_name().to_string();
        if self.entries.insert(name.clone(), entry).is_some() {
            warn!(block_type = %name, "Replacing registered block type");
        } else {
            debug!(block_type = %name, "Registered block type");
        }
    }

    pub fn lookup(&self, type_name: &str) -> Option<&SchemaEntry> {
        self.entries.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.values()
    }

    pub fn kinds(&self) -> Vec<BlockKind> {
        self.entries.values().map(|e| e.kind.clone()).collect()
    }

    pub fn validate(&self, type_name: &str, data: &BlockData) -> Result<(), ValidationErrors> {
        match self.lookup(type_name) {
            Some(entry) => entry.validate(data),
            None => Err(ValidationErrors::single(
                FieldError::new("type", "validation.unknown-type").param("type", type_name),
            )),
        }
    }

    pub fn validate_block(&self, block: &BlockNode) -> Result<(), ValidationErrors> {
        self.validate(&block.block_type, &block.data)
    }

    /// Validate every block of a tree, including placement of each child
    pub fn validate_tree(&self, root: &BlockNode) -> Vec<BlockIssue> {
        struct TreeValidator<'a> {
            registry: &'a SchemaRegistry,
            issues: Vec<BlockIssue>,
        }

        impl Visitor for TreeValidator<'_> {
            fn visit_block(&mut self, block: &BlockNode) {
                let mut errors = match self.registry.validate_block(block) {
                    Ok(()) => Vec::new(),
                    Err(e) => e.0,
                };
                for (slot, children) in &block.slots {
                    for (index, child) in children.iter().enumerate() {
                        if !self.registry.contains(&block.block_type) || !self.registry.contains(&child.block_type) {
                            continue;
                        }
                        if let Err(rejection) = self.registry.can_insert(&block.block_type, slot, &child.block_type) {
                            errors.push(
                                FieldError::new(&format!("slots.{}[{}]", slot, index), "validation.placement")
                                    .param("reason", rejection.message_with(&FallbackTranslator)),
                            );
                        }
                    }
                }
                if !errors.is_empty() {
                    self.issues.push(BlockIssue {
                        block_id: block.id.clone(),
                        block_type: block.block_type.clone(),
                        errors: ValidationErrors(errors),
                    });
                }
                walk_block(self, block);
            }
        }

        let mut validator = TreeValidator {
            registry: self,
            issues: Vec::new(),
        };
        validator.visit_block(root);
        validator.issues
    }

    pub fn default_value(&self, type_name: &str) -> Option<BlockData> {
        self.lookup(type_name).map(SchemaEntry::default_value)
    }

    /// Fresh block of `type_name` with default data and its declared slots
    pub fn create_block(&self, type_name: &str, ids: &mut IdGenerator) -> Option<BlockNode> {
        let entry = self.lookup(type_name)?;
        let mut block = BlockNode::new(entry.type_name(), ids.new_id());
        block.data = entry.default_value();
        for slot in &entry.slots {
            block = block.with_slot(slot.name.clone());
        }
        Some(block)
    }

    pub fn can_insert(&self, parent_type: &str, slot: &str, child_type: &str) -> Result<(), InsertRejection> {
        let parent = self
            .lookup(parent_type)
            .ok_or_else(|| InsertRejection::UnknownParent(parent_type.to_string()))?;
        let child = self
            .lookup(child_type)
            .ok_or_else(|| InsertRejection::UnknownChild(child_type.to_string()))?;
        let spec = parent.slot_spec(slot).ok_or_else(|| InsertRejection::NoSuchSlot {
            parent: parent_type.to_string(),
            slot: slot.to_string(),
        })?;

        if !spec.allow.accepts(&child.kind, &child.capabilities) {
            return Err(InsertRejection::SlotDisallows {
                parent: parent_type.to_string(),
                slot: slot.to_string(),
                child: child_type.to_string(),
            });
        }

        if let Some(allowed) = &child.allowed_parents {
            if !allowed.contains(&parent.kind) {
                let allowed = if allowed.is_empty() {
                    "nothing".to_string()
                } else {
                    allowed.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
                };
                return Err(InsertRejection::ParentDisallowed {
                    child: child_type.to_string(),
                    allowed,
                });
            }
        }

        Ok(())
    }

    /// Every registered type that `can_insert` accepts
    pub fn insertable_types(&self, parent_type: &str, slot: &str) -> Vec<BlockKind> {
        self.entries
            .values()
            .filter(|child| self.can_insert(parent_type, slot, child.type_name()).is_ok())
            .map(|child| child.kind.clone())
            .collect()
    }

    /// Computed default style of a block; empty for unknown types
    pub fn default_styles(&self, block: &BlockNode, is_editor: bool) -> StyleDefaults {
        self.lookup(&block.block_type)
            .map(|entry| (entry.default_styles)(&block.data.props, &block.data.style, is_editor))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::AllowPredicate;
    use crate::field::FieldSchema;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .register(
                SchemaEntry::new(BlockKind::Container)
                    .capability(Capability::Layout)
                    .slot(SlotSpec::any("children")),
            )
            .register(
                SchemaEntry::new(BlockKind::Accordion)
                    .slot(SlotSpec::new("children", AllowPredicate::Capability(Capability::AccordionItem))),
            )
            .register(
                SchemaEntry::new(BlockKind::AccordionItem)
                    .capability(Capability::AccordionItem)
                    .parents([BlockKind::Accordion])
                    .schema(ObjectSchema::new().field("title", FieldSchema::string().with_default("Item")))
                    .slot(SlotSpec::any("content")),
            )
    }

    #[test]
    fn test_unknown_type_validation() {
        let errors = registry().validate("Carousel", &BlockData::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.0[0].key, "builder.validation.unknown-type");
        assert_eq!(errors.0[0].message(), "Unknown block type Carousel");
    }

    #[test]
    fn test_can_insert() {
        let registry = registry();
        assert!(registry.can_insert("Accordion", "children", "AccordionItem").is_ok());
        assert!(registry.can_insert("AccordionItem", "content", "Container").is_ok());
        assert_eq!(
            registry.can_insert("Container", "children", "AccordionItem"),
            Err(InsertRejection::ParentDisallowed {
                child: "AccordionItem".into(),
                allowed: "Accordion".into(),
            })
        );
        assert!(matches!(
            registry.can_insert("Accordion", "children", "Container"),
            Err(InsertRejection::SlotDisallows { .. })
        ));
        assert!(matches!(
            registry.can_insert("Container", "footer", "Container"),
            Err(InsertRejection::NoSuchSlot { .. })
        ));
    }

    #[test]
    fn test_insertable_types() {
        let registry = registry();
        assert_eq!(registry.insertable_types("Accordion", "children"), vec![BlockKind::AccordionItem]);
        assert_eq!(
            registry.insertable_types("Container", "children"),
            vec![BlockKind::Accordion, BlockKind::Container]
        );
    }

    #[test]
    fn test_create_block() {
        let mut ids = IdGenerator::sequential("b");
        let block = registry().create_block("AccordionItem", &mut ids).unwrap();
        assert_eq!(block.id, "b-1");
        assert_eq!(block.prop_str("title"), Some("Item"));
        assert!(block.slots.contains_key("content"));
        assert!(registry().create_block("Nope", &mut ids).is_none());
    }

    #[test]
    fn test_rejection_message() {
        let rejection = InsertRejection::ParentDisallowed {
            child: "AccordionItem".into(),
            allowed: "Accordion".into(),
        };
        assert_eq!(
            rejection.message_with(&FallbackTranslator),
            "AccordionItem can only be placed inside Accordion"
        );
    }
}
