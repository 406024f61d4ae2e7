//! Block nodes

use crate::kind::BlockKind;
use blockwork_style::StyleMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Schema-validated property bag of a block
pub type Props = Map<String, Value>;

/// Named child slots. Children are shared between tree versions.
pub type Slots = BTreeMap<String, Vec<Arc<BlockNode>>>;

/// The slot most container blocks render their children from
pub const CHILDREN_SLOT: &str = "children";

/// A single block in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default)]
    pub block_type: String,

    #[serde(default)]
    pub data: BlockData,

    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_slots"
    )]
    pub slots: Slots,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<BlockBase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    #[serde(default, deserialize_with = "deserialize_props")]
    pub props: Props,

    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,
}

/// Optional identity shared with the published markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl BlockNode {
    pub fn new(block_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            data: BlockData::default(),
            slots: Slots::new(),
            base: None,
        }
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.props.insert(name.into(), value.into());
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.data.props = props;
        self
    }

    pub fn with_style(mut self, style: StyleMap) -> Self {
        self.data.style = style;
        self
    }

    /// Declare a slot without children
    pub fn with_slot(mut self, name: impl Into<String>) -> Self {
        self.slots.entry(name.into()).or_default();
        self
    }

    pub fn with_child(mut self, slot: impl Into<String>, child: BlockNode) -> Self {
        self.slots
            .entry(slot.into())
            .or_default()
            .push(Arc::new(child));
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.base.get_or_insert_with(BlockBase::default).class_name = Some(class_name.into());
        self
    }

    pub fn kind(&self) -> BlockKind {
        BlockKind::parse(&self.block_type)
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.data.props.get(name)
    }

    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.prop(name).and_then(Value::as_str)
    }

    pub fn prop_bool(&self, name: &str) -> Option<bool> {
        self.prop(name).and_then(Value::as_bool)
    }

    /// Children of a slot; empty when the slot is absent
    pub fn slot(&self, name: &str) -> &[Arc<BlockNode>] {
        self.slots.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children(&self) -> &[Arc<BlockNode>] {
        self.slot(CHILDREN_SLOT)
    }

    pub fn class_name(&self) -> Option<&str> {
        self.base.as_ref().and_then(|b| b.class_name.as_deref())
    }

    pub fn html_id(&self) -> Option<&str> {
        self.base.as_ref().and_then(|b| b.id.as_deref())
    }

    /// Number of blocks in this subtree, self included
    pub fn subtree_size(&self) -> usize {
        1 + self
            .slots
            .values()
            .flatten()
            .map(|child| child.subtree_size())
            .sum::<usize>()
    }
}

/// Props that are not an object are dropped rather than failing the document.
fn deserialize_props<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Props, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Props::new()),
        other => {
            warn!(value = %other, "Ignoring non-object block props");
            Ok(Props::new())
        }
    }
}

/// Malformed children are skipped individually so their siblings survive.
fn deserialize_slots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Slots, D::Error> {
    let raw = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        Value::Null => return Ok(Slots::new()),
        other => {
            warn!(value = %other, "Ignoring non-object slots");
            return Ok(Slots::new());
        }
    };

    let mut slots = Slots::new();
    for (name, children) in raw {
        let Value::Array(items) = children else {
            warn!(slot = %name, "Ignoring slot that is not an array");
            slots.insert(name, Vec::new());
            continue;
        };
        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<BlockNode>(item) {
                Ok(node) => parsed.push(Arc::new(node)),
                Err(e) => warn!(slot = %name, error = %e, "Skipping malformed block"),
            }
        }
        slots.insert(name, parsed);
    }
    Ok(slots)
}
