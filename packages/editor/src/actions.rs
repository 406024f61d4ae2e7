//! Edit actions
//!
//! Every change the editor makes to a document is one [`Action`]. Applying an
//! action never touches the old tree: it returns a new root that shares all
//! untouched subtrees with the previous one.
//!
//! # Semantics
//!
//! ## Placement
//!
//! `InsertChild`, `MoveBlock` and a type-changing `ReplaceBlock` consult the
//! registry's placement rules first. A rejected placement leaves the tree as
//! it was.
//!
//! ## Move
//!
//! `MoveBlock` detaches and re-attaches in one step, so a block is never
//! observed in two places or in none. Moving a block into its own subtree is a
//! cycle and fails.
//!
//! ## Data
//!
//! `SetBlockData` replaces the props wholesale after validating them against
//! the block type's schema. `SetBlockStyle` replaces the style map.

use crate::errors::ActionError;
use blockwork_model::{
    check_unique_ids, find_parent, get_node, try_duplicate_node, try_insert_child,
    try_move_child, try_move_node, try_remove_node, try_replace_node, BlockNode, IdGenerator,
    Props, TreeError,
};
use blockwork_schema::SchemaRegistry;
use blockwork_style::StyleMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Action {
    SetBlockData {
        block_id: String,
        props: Props,
    },
    SetBlockStyle {
        block_id: String,
        style: StyleMap,
    },
    InsertChild {
        parent_id: String,
        slot: String,
        index: usize,
        block: BlockNode,
    },
    RemoveBlock {
        block_id: String,
    },
    MoveChild {
        parent_id: String,
        slot: String,
        from: usize,
        to: usize,
    },
    MoveBlock {
        block_id: String,
        parent_id: String,
        slot: String,
        index: usize,
    },
    ReplaceBlock {
        block_id: String,
        block: BlockNode,
    },
    DuplicateBlock {
        block_id: String,
    },
    ReplaceDocument {
        root: Arc<BlockNode>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetBlockData { .. } => "set-block-data",
            Action::SetBlockStyle { .. } => "set-block-style",
            Action::InsertChild { .. } => "insert-child",
            Action::RemoveBlock { .. } => "remove-block",
            Action::MoveChild { .. } => "move-child",
            Action::MoveBlock { .. } => "move-block",
            Action::ReplaceBlock { .. } => "replace-block",
            Action::DuplicateBlock { .. } => "duplicate-block",
            Action::ReplaceDocument { .. } => "replace-document",
        }
    }

    /// The block the action is about, if it names one
    pub fn target(&self) -> Option<&str> {
        match self {
            Action::SetBlockData { block_id, .. }
            | Action::SetBlockStyle { block_id, .. }
            | Action::RemoveBlock { block_id }
            | Action::MoveBlock { block_id, .. }
            | Action::ReplaceBlock { block_id, .. }
            | Action::DuplicateBlock { block_id } => Some(block_id),
            Action::InsertChild { block, .. } => Some(&block.id),
            Action::MoveChild { .. } | Action::ReplaceDocument { .. } => None,
        }
    }

    /// Human-readable label for history entries
    pub fn description(&self) -> String {
        match self {
            Action::InsertChild { block, .. } => format!("Insert {}", block.block_type),
            Action::ReplaceDocument { .. } => "Replace document".to_string(),
            other => match other.target() {
                Some(id) => format!("{} {}", other.name(), id),
                None => other.name().to_string(),
            },
        }
    }

    /// Apply the action to `root`, returning the new root
    pub fn apply(
        &self,
        root: &Arc<BlockNode>,
        registry: &SchemaRegistry,
        ids: &mut IdGenerator,
    ) -> Result<Arc<BlockNode>, ActionError> {
        match self {
            Action::SetBlockData { block_id, props } => {
                let node = require(root, block_id)?;
                let mut next = BlockNode::clone(node);
                next.data.props = props.clone();
                registry
                    .validate_block(&next)
                    .map_err(|errors| ActionError::Validation {
                        block_id: block_id.clone(),
                        errors,
                    })?;
                Ok(try_replace_node(root, block_id, next)?)
            }

            Action::SetBlockStyle { block_id, style } => {
                let node = require(root, block_id)?;
                let mut next = BlockNode::clone(node);
                next.data.style = style.clone();
                Ok(try_replace_node(root, block_id, next)?)
            }

            Action::InsertChild {
                parent_id,
                slot,
                index,
                block,
            } => {
                let parent = get_node(root, parent_id)
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone()))?;
                registry.can_insert(&parent.block_type, slot, &block.block_type)?;
                validate_subtree(registry, block)?;
                Ok(try_insert_child(root, parent_id, slot, *index, block.clone())?)
            }

            Action::RemoveBlock { block_id } => Ok(try_remove_node(root, block_id)?),

            Action::MoveChild {
                parent_id,
                slot,
                from,
                to,
            } => Ok(try_move_child(root, parent_id, slot, *from, *to)?),

            Action::MoveBlock {
                block_id,
                parent_id,
                slot,
                index,
            } => {
                let node = require(root, block_id)?;
                let parent = get_node(root, parent_id)
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone()))?;
                registry.can_insert(&parent.block_type, slot, &node.block_type)?;
                Ok(try_move_node(root, block_id, parent_id, slot, *index)?)
            }

            Action::ReplaceBlock { block_id, block } => {
                let old = require(root, block_id)?;
                if old.block_type != block.block_type {
                    if let Some(location) = find_parent(root, block_id) {
                        registry.can_insert(
                            &location.parent.block_type,
                            &location.slot,
                            &block.block_type,
                        )?;
                    }
                }
                let mut next = block.clone();
                next.id = block_id.clone();
                validate_subtree(registry, &next)?;
                Ok(try_replace_node(root, block_id, next)?)
            }

            Action::DuplicateBlock { block_id } => {
                let (next, _) = try_duplicate_node(root, block_id, ids)?;
                Ok(next)
            }

            Action::ReplaceDocument { root: next } => {
                check_unique_ids(next)?;
                Ok(next.clone())
            }
        }
    }
}

fn require<'a>(root: &'a Arc<BlockNode>, id: &str) -> Result<&'a Arc<BlockNode>, ActionError> {
    get_node(root, id).ok_or_else(|| ActionError::Tree(TreeError::NodeNotFound(id.to_string())))
}

/// Incoming blocks must be valid all the way down
fn validate_subtree(registry: &SchemaRegistry, block: &BlockNode) -> Result<(), ActionError> {
    match registry.validate_tree(block).into_iter().next() {
        Some(issue) => Err(ActionError::Validation {
            block_id: issue.block_id,
            errors: issue.errors,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockwork_model::CHILDREN_SLOT;
    use blockwork_schema::InsertRejection;
    use serde_json::json;

    fn page() -> Arc<BlockNode> {
        Arc::new(
            BlockNode::new("PageLayout", "root")
                .with_child(
                    CHILDREN_SLOT,
                    BlockNode::new("Container", "left")
                        .with_child(CHILDREN_SLOT, BlockNode::new("Text", "t1").with_prop("content", "One"))
                        .with_child(CHILDREN_SLOT, BlockNode::new("Text", "t2").with_prop("content", "Two")),
                )
                .with_child(CHILDREN_SLOT, BlockNode::new("Container", "right").with_slot(CHILDREN_SLOT)),
        )
    }

    fn apply(action: &Action, root: &Arc<BlockNode>) -> Result<Arc<BlockNode>, ActionError> {
        action.apply(root, &SchemaRegistry::builtin(), &mut IdGenerator::sequential("n"))
    }

    #[test]
    fn test_serde_shape() {
        let action: Action = serde_json::from_value(json!({
            "type": "move-block",
            "blockId": "t1",
            "parentId": "right",
            "slot": "children",
            "index": 0
        }))
        .unwrap();
        assert_eq!(action.name(), "move-block");
        assert_eq!(action.target(), Some("t1"));
        assert_eq!(serde_json::to_value(&action).unwrap()["blockId"], "t1");
    }

    #[test]
    fn test_set_block_data_validates() {
        let root = page();
        let mut props = Props::new();
        props.insert("level".into(), json!(9));
        props.insert("content".into(), json!("Title"));
        let heading_page = apply(
            &Action::InsertChild {
                parent_id: "root".into(),
                slot: CHILDREN_SLOT.into(),
                index: 0,
                block: BlockNode::new("Heading", "h").with_prop("level", 2),
            },
            &root,
        )
        .unwrap();

        let err = apply(
            &Action::SetBlockData {
                block_id: "h".into(),
                props,
            },
            &heading_page,
        )
        .unwrap_err();

        match err {
            ActionError::Validation { block_id, errors } => {
                assert_eq!(block_id, "h");
                assert_eq!(errors.for_path("props.level").count(), 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_move_block_across_containers() {
        let root = page();
        let next = apply(
            &Action::MoveBlock {
                block_id: "t1".into(),
                parent_id: "right".into(),
                slot: CHILDREN_SLOT.into(),
                index: 0,
            },
            &root,
        )
        .unwrap();

        let left = get_node(&next, "left").unwrap();
        let right = get_node(&next, "right").unwrap();
        assert_eq!(left.children().len(), 1);
        assert_eq!(right.children()[0].id, "t1");
        assert!(Arc::ptr_eq(&right.children()[0], get_node(&root, "t1").unwrap()));
    }

    #[test]
    fn test_insert_respects_placement() {
        let err = apply(
            &Action::InsertChild {
                parent_id: "left".into(),
                slot: CHILDREN_SLOT.into(),
                index: 0,
                block: BlockNode::new("AccordionItem", "item"),
            },
            &page(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ActionError::Rejected(InsertRejection::ParentDisallowed { .. })
        ));
    }

    #[test]
    fn test_move_into_own_subtree_fails() {
        let err = apply(
            &Action::MoveBlock {
                block_id: "left".into(),
                parent_id: "left".into(),
                slot: CHILDREN_SLOT.into(),
                index: 0,
            },
            &page(),
        )
        .unwrap_err();
        assert_eq!(err, ActionError::Tree(TreeError::CycleDetected));
    }

    #[test]
    fn test_replace_document_rejects_duplicate_ids() {
        let dup = Arc::new(
            BlockNode::new("PageLayout", "root")
                .with_child(CHILDREN_SLOT, BlockNode::new("Text", "x"))
                .with_child(CHILDREN_SLOT, BlockNode::new("Text", "x")),
        );
        let err = apply(&Action::ReplaceDocument { root: dup }, &page()).unwrap_err();
        assert_eq!(err, ActionError::Tree(TreeError::DuplicateId("x".into())));
    }

    #[test]
    fn test_duplicate_uses_generator() {
        let next = apply(&Action::DuplicateBlock { block_id: "t2".into() }, &page()).unwrap();
        let left = get_node(&next, "left").unwrap();
        let ids: Vec<_> = left.children().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t2", "n-1"]);
    }
}
