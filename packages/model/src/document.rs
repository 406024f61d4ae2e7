use crate::block::{BlockNode, CHILDREN_SLOT};
use crate::error::DocumentError;
use crate::id::IdGenerator;
use crate::tree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Block type of every document root
pub const ROOT_TYPE: &str = "PageLayout";

/// A stored page: one tree of blocks under a `PageLayout` root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub root: Arc<BlockNode>,
}

impl Document {
    pub fn new(root: Arc<BlockNode>) -> Self {
        Self { root }
    }

    /// Empty page with a freshly generated root id
    pub fn empty() -> Self {
        Self::empty_with(&mut IdGenerator::random())
    }

    pub fn empty_with(ids: &mut IdGenerator) -> Self {
        let root = BlockNode::new(ROOT_TYPE, ids.new_id()).with_slot(CHILDREN_SLOT);
        Self::new(Arc::new(root))
    }

    /// Parse a stored document.
    ///
    /// Reading is tolerant: missing fields take their defaults, unknown fields
    /// are ignored, and blocks with a missing or repeated id get a fresh one.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        let root: BlockNode = serde_json::from_value(value)?;
        if root.block_type != ROOT_TYPE {
            warn!(block_type = %root.block_type, "Document root is not a {}", ROOT_TYPE);
        }

        let mut seen = HashSet::new();
        let mut ids = IdGenerator::random();
        let root = repair_ids(&root, &mut seen, &mut ids);
        debug!(blocks = seen.len(), "Loaded document");

        Ok(Self::new(Arc::new(root)))
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<BlockNode>> {
        tree::get_node(&self.root, id)
    }

    pub fn block_count(&self) -> usize {
        self.root.subtree_size()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<BlockNode> for Document {
    fn from(root: BlockNode) -> Self {
        Self::new(Arc::new(root))
    }
}

fn repair_ids(node: &BlockNode, seen: &mut HashSet<String>, ids: &mut IdGenerator) -> BlockNode {
    let mut repaired = BlockNode {
        id: node.id.clone(),
        block_type: node.block_type.clone(),
        data: node.data.clone(),
        slots: Default::default(),
        base: node.base.clone(),
    };

    if repaired.id.is_empty() || seen.contains(&repaired.id) {
        let fresh = ids.new_id();
        warn!(block_id = %repaired.id, new_id = %fresh, block_type = %repaired.block_type, "Assigning fresh block id");
        repaired.id = fresh;
    }
    seen.insert(repaired.id.clone());

    for (slot, children) in &node.slots {
        let children = children
            .iter()
            .map(|child| Arc::new(repair_ids(child, seen, ids)))
            .collect();
        repaired.slots.insert(slot.clone(), children);
    }
    repaired
}
