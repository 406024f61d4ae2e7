//! Immutable tree operations
//!
//! Every operation returns a new root. Only the blocks on the path from the
//! root to the edited block are copied; all other subtrees are shared with the
//! previous version through their `Arc`.
//!
//! The plain functions treat a missing target as a no-op: they log a warning
//! and hand back the unchanged root. The `try_*` variants report the error.

use crate::block::BlockNode;
use crate::error::{TreeError, TreeResult};
use crate::id::IdGenerator;
use crate::visitor::{walk_block, Visitor};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a block sits inside its parent
#[derive(Debug, Clone)]
pub struct ParentLocation {
    pub parent: Arc<BlockNode>,
    pub slot: String,
    pub index: usize,
}

/// Find a block by id (depth-first)
pub fn get_node<'a>(root: &'a Arc<BlockNode>, id: &str) -> Option<&'a Arc<BlockNode>> {
    if root.id == id {
        return Some(root);
    }
    root.slots
        .values()
        .flatten()
        .find_map(|child| get_node(child, id))
}

pub fn contains(root: &Arc<BlockNode>, id: &str) -> bool {
    get_node(root, id).is_some()
}

pub fn find_parent(root: &Arc<BlockNode>, id: &str) -> Option<ParentLocation> {
    for (slot, children) in &root.slots {
        for (index, child) in children.iter().enumerate() {
            if child.id == id {
                return Some(ParentLocation {
                    parent: root.clone(),
                    slot: slot.clone(),
                    index,
                });
            }
            if let Some(found) = find_parent(child, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Ids of every block in the subtree
pub fn collect_ids(root: &BlockNode) -> Vec<String> {
    struct IdCollector(Vec<String>);

    impl Visitor for IdCollector {
        fn visit_block(&mut self, block: &BlockNode) {
            self.0.push(block.id.clone());
            walk_block(self, block);
        }
    }

    let mut collector = IdCollector(Vec::new());
    collector.visit_block(root);
    collector.0
}

/// Fails with the first id that appears twice
pub fn check_unique_ids(root: &BlockNode) -> TreeResult<()> {
    let mut seen = HashSet::new();
    for id in collect_ids(root) {
        if !seen.insert(id.clone()) {
            return Err(TreeError::DuplicateId(id));
        }
    }
    Ok(())
}

/// Rebuild the path down to `id`, applying `f` to the target block.
/// Returns `None` when the target is not in this subtree.
fn update_node<F>(node: &Arc<BlockNode>, id: &str, f: &mut F) -> TreeResult<Option<Arc<BlockNode>>>
where
    F: FnMut(&BlockNode) -> TreeResult<BlockNode>,
{
    if node.id == id {
        return f(node).map(|updated| Some(Arc::new(updated)));
    }

    for (slot, children) in &node.slots {
        for (index, child) in children.iter().enumerate() {
            if let Some(updated) = update_node(child, id, f)? {
                let mut next = (**node).clone();
                if let Some(children) = next.slots.get_mut(slot) {
                    children[index] = updated;
                }
                return Ok(Some(Arc::new(next)));
            }
        }
    }

    Ok(None)
}

fn ensure_fresh_ids(root: &BlockNode, incoming: &BlockNode, except: Option<&BlockNode>) -> TreeResult<()> {
    let mut existing: HashSet<String> = collect_ids(root).into_iter().collect();
    if let Some(replaced) = except {
        for id in collect_ids(replaced) {
            existing.remove(&id);
        }
    }

    let mut seen = HashSet::new();
    for id in collect_ids(incoming) {
        if existing.contains(&id) || !seen.insert(id.clone()) {
            return Err(TreeError::DuplicateId(id));
        }
    }
    Ok(())
}

/// Replace the block with `id`. The replacement keeps the id of the block it
/// replaces.
pub fn try_replace_node(
    root: &Arc<BlockNode>,
    id: &str,
    new_node: BlockNode,
) -> TreeResult<Arc<BlockNode>> {
    let old = get_node(root, id).ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;

    let mut new_node = new_node;
    new_node.id = id.to_string();
    ensure_fresh_ids(root, &new_node, Some(old))?;

    let mut replacement = Some(new_node);
    update_node(root, id, &mut |_: &BlockNode| {
        replacement
            .take()
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))
    })?
    .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))
}

/// Insert `node` into `slot` of `parent_id`. The index is clamped to the slot
/// length and the slot is created when absent.
pub fn try_insert_child(
    root: &Arc<BlockNode>,
    parent_id: &str,
    slot: &str,
    index: usize,
    node: BlockNode,
) -> TreeResult<Arc<BlockNode>> {
    if !contains(root, parent_id) {
        return Err(TreeError::ParentNotFound(parent_id.to_string()));
    }
    ensure_fresh_ids(root, &node, None)?;

    let mut child = Some(Arc::new(node));
    update_node(root, parent_id, &mut |parent: &BlockNode| {
        let mut next = parent.clone();
        let children = next.slots.entry(slot.to_string()).or_default();
        let at = index.min(children.len());
        if let Some(child) = child.take() {
            children.insert(at, child);
        }
        Ok(next)
    })?
    .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))
}

/// Remove the child `id` from `slot` of `parent_id`
pub fn try_remove_child(
    root: &Arc<BlockNode>,
    parent_id: &str,
    slot: &str,
    id: &str,
) -> TreeResult<Arc<BlockNode>> {
    update_node(root, parent_id, &mut |parent: &BlockNode| {
        let mut next = parent.clone();
        let children = next.slots.get_mut(slot).ok_or_else(|| TreeError::SlotNotFound {
            parent_id: parent_id.to_string(),
            slot: slot.to_string(),
        })?;
        let position = children
            .iter()
            .position(|child| child.id == id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        children.remove(position);
        Ok(next)
    })?
    .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))
}

/// Reorder within one slot. `to` is clamped to the last position.
pub fn try_move_child(
    root: &Arc<BlockNode>,
    parent_id: &str,
    slot: &str,
    from: usize,
    to: usize,
) -> TreeResult<Arc<BlockNode>> {
    update_node(root, parent_id, &mut |parent: &BlockNode| {
        let mut next = parent.clone();
        let children = next.slots.get_mut(slot).ok_or_else(|| TreeError::SlotNotFound {
            parent_id: parent_id.to_string(),
            slot: slot.to_string(),
        })?;
        if from >= children.len() {
            return Err(TreeError::IndexOutOfBounds {
                slot: slot.to_string(),
                index: from,
                len: children.len(),
            });
        }
        let child = children.remove(from);
        let at = to.min(children.len());
        children.insert(at, child);
        Ok(next)
    })?
    .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))
}

/// Remove a block wherever it lives
pub fn try_remove_node(root: &Arc<BlockNode>, id: &str) -> TreeResult<Arc<BlockNode>> {
    if root.id == id {
        return Err(TreeError::RootImmutable);
    }
    let location = find_parent(root, id).ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
    try_remove_child(root, &location.parent.id, &location.slot, id)
}

/// Move a block to `slot` of `parent_id` in one step. `index` refers to the
/// target slot after the block has been taken out of its old position.
pub fn try_move_node(
    root: &Arc<BlockNode>,
    id: &str,
    parent_id: &str,
    slot: &str,
    index: usize,
) -> TreeResult<Arc<BlockNode>> {
    if root.id == id {
        return Err(TreeError::RootImmutable);
    }
    let node = get_node(root, id).ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
    if !contains(root, parent_id) {
        return Err(TreeError::ParentNotFound(parent_id.to_string()));
    }
    if contains(node, parent_id) {
        return Err(TreeError::CycleDetected);
    }

    let node = node.clone();
    let without = try_remove_node(root, id)?;

    let mut child = Some(node);
    update_node(&without, parent_id, &mut |parent: &BlockNode| {
        let mut next = parent.clone();
        let children = next.slots.entry(slot.to_string()).or_default();
        let at = index.min(children.len());
        if let Some(child) = child.take() {
            children.insert(at, child);
        }
        Ok(next)
    })?
    .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))
}

/// Deep copy of `node` with fresh ids throughout
pub fn clone_with_fresh_ids(node: &BlockNode, ids: &mut IdGenerator) -> BlockNode {
    let mut copy = BlockNode {
        id: ids.new_id(),
        block_type: node.block_type.clone(),
        data: node.data.clone(),
        slots: Default::default(),
        base: node.base.clone(),
    };
    for (slot, children) in &node.slots {
        let cloned = children
            .iter()
            .map(|child| Arc::new(clone_with_fresh_ids(child, ids)))
            .collect();
        copy.slots.insert(slot.clone(), cloned);
    }
    copy
}

/// Copy a block with fresh ids and insert the copy right after the original.
/// Returns the new root and the id of the copy.
pub fn try_duplicate_node(
    root: &Arc<BlockNode>,
    id: &str,
    ids: &mut IdGenerator,
) -> TreeResult<(Arc<BlockNode>, String)> {
    if root.id == id {
        return Err(TreeError::RootImmutable);
    }
    let location = find_parent(root, id).ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
    let original = &location.parent.slot(&location.slot)[location.index];
    let copy = clone_with_fresh_ids(original, ids);
    let copy_id = copy.id.clone();

    let root = try_insert_child(root, &location.parent.id, &location.slot, location.index + 1, copy)?;
    debug!(block_id = %id, copy_id = %copy_id, "Duplicated block");
    Ok((root, copy_id))
}

fn or_unchanged(root: &Arc<BlockNode>, op: &str, result: TreeResult<Arc<BlockNode>>) -> Arc<BlockNode> {
    match result {
        Ok(next) => next,
        Err(e) => {
            warn!(operation = op, error = %e, "Tree operation skipped");
            root.clone()
        }
    }
}

pub fn replace_node(root: &Arc<BlockNode>, id: &str, new_node: BlockNode) -> Arc<BlockNode> {
    or_unchanged(root, "replace_node", try_replace_node(root, id, new_node))
}

pub fn insert_child(
    root: &Arc<BlockNode>,
    parent_id: &str,
    slot: &str,
    index: usize,
    node: BlockNode,
) -> Arc<BlockNode> {
    or_unchanged(root, "insert_child", try_insert_child(root, parent_id, slot, index, node))
}

pub fn remove_child(root: &Arc<BlockNode>, parent_id: &str, slot: &str, id: &str) -> Arc<BlockNode> {
    or_unchanged(root, "remove_child", try_remove_child(root, parent_id, slot, id))
}

pub fn move_child(
    root: &Arc<BlockNode>,
    parent_id: &str,
    slot: &str,
    from: usize,
    to: usize,
) -> Arc<BlockNode> {
    or_unchanged(root, "move_child", try_move_child(root, parent_id, slot, from, to))
}

pub fn remove_node(root: &Arc<BlockNode>, id: &str) -> Arc<BlockNode> {
    or_unchanged(root, "remove_node", try_remove_node(root, id))
}

pub fn move_node(
    root: &Arc<BlockNode>,
    id: &str,
    parent_id: &str,
    slot: &str,
    index: usize,
) -> Arc<BlockNode> {
    or_unchanged(root, "move_node", try_move_node(root, id, parent_id, slot, index))
}

pub fn duplicate_node(root: &Arc<BlockNode>, id: &str, ids: &mut IdGenerator) -> Arc<BlockNode> {
    match try_duplicate_node(root, id, ids) {
        Ok((next, _)) => next,
        Err(e) => {
            warn!(operation = "duplicate_node", error = %e, "Tree operation skipped");
            root.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str) -> BlockNode {
        BlockNode::new("Text", id).with_prop("content", id)
    }

    /// root
    /// ├── a (Container): a1, a2
    /// └── b (Container): b1
    fn sample() -> Arc<BlockNode> {
        Arc::new(
            BlockNode::new("PageLayout", "root")
                .with_child(
                    "children",
                    BlockNode::new("Container", "a")
                        .with_child("children", text("a1"))
                        .with_child("children", text("a2")),
                )
                .with_child(
                    "children",
                    BlockNode::new("Container", "b").with_child("children", text("b1")),
                ),
        )
    }

    fn child_ids(root: &Arc<BlockNode>, parent: &str) -> Vec<String> {
        get_node(root, parent)
            .unwrap()
            .children()
            .iter()
            .map(|c| c.id.clone())
            .collect()
    }

    #[test]
    fn test_get_node() {
        let root = sample();
        assert_eq!(get_node(&root, "b1").unwrap().block_type, "Text");
        assert!(get_node(&root, "zzz").is_none());
    }

    #[test]
    fn test_replace_shares_untouched_subtrees() {
        let root = sample();
        let next = replace_node(&root, "a1", text("ignored").with_prop("content", "new"));

        assert_eq!(get_node(&next, "a1").unwrap().prop_str("content"), Some("new"));
        // old version untouched
        assert_eq!(get_node(&root, "a1").unwrap().prop_str("content"), Some("a1"));

        assert!(Arc::ptr_eq(get_node(&root, "b").unwrap(), get_node(&next, "b").unwrap()));
        assert!(Arc::ptr_eq(get_node(&root, "a2").unwrap(), get_node(&next, "a2").unwrap()));
        assert!(!Arc::ptr_eq(get_node(&root, "a").unwrap(), get_node(&next, "a").unwrap()));
    }

    #[test]
    fn test_missing_target_is_noop() {
        let root = sample();
        let next = replace_node(&root, "missing", text("x"));
        assert!(Arc::ptr_eq(&root, &next));

        let next = remove_child(&root, "a", "children", "b1");
        assert!(Arc::ptr_eq(&root, &next));

        assert_eq!(
            try_remove_child(&root, "a", "children", "b1"),
            Err(TreeError::NodeNotFound("b1".into()))
        );
        assert_eq!(
            try_remove_child(&root, "a", "content", "a1"),
            Err(TreeError::SlotNotFound { parent_id: "a".into(), slot: "content".into() })
        );
    }

    #[test]
    fn test_insert_clamps_index() {
        let root = sample();
        let next = insert_child(&root, "b", "children", 99, text("b2"));
        assert_eq!(child_ids(&next, "b"), vec!["b1", "b2"]);

        let next = insert_child(&next, "b", "children", 0, text("b0"));
        assert_eq!(child_ids(&next, "b"), vec!["b0", "b1", "b2"]);
    }

    #[test]
    fn test_insert_creates_slot() {
        let root = sample();
        let next = try_insert_child(&root, "a1", "content", 0, text("x")).unwrap();
        assert_eq!(get_node(&next, "a1").unwrap().slot("content").len(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let root = sample();
        assert_eq!(
            try_insert_child(&root, "b", "children", 0, text("a1")),
            Err(TreeError::DuplicateId("a1".into()))
        );
        assert_eq!(
            try_insert_child(&root, "nope", "children", 0, text("x")),
            Err(TreeError::ParentNotFound("nope".into()))
        );
    }

    #[test]
    fn test_move_child() {
        let root = sample();
        let next = move_child(&root, "a", "children", 0, 5);
        assert_eq!(child_ids(&next, "a"), vec!["a2", "a1"]);

        assert!(matches!(
            try_move_child(&root, "a", "children", 2, 0),
            Err(TreeError::IndexOutOfBounds { index: 2, len: 2, .. })
        ));
    }

    #[test]
    fn test_remove_node() {
        let root = sample();
        let next = remove_node(&root, "a");
        assert_eq!(child_ids(&next, "root"), vec!["b"]);
        assert!(get_node(&next, "a1").is_none());
        assert_eq!(try_remove_node(&root, "root"), Err(TreeError::RootImmutable));
    }

    #[test]
    fn test_move_node_across_containers() {
        let root = sample();
        let next = try_move_node(&root, "a1", "b", "children", 0).unwrap();
        assert_eq!(child_ids(&next, "a"), vec!["a2"]);
        assert_eq!(child_ids(&next, "b"), vec!["a1", "b1"]);
        // the moved subtree itself is shared
        assert!(Arc::ptr_eq(get_node(&root, "a1").unwrap(), get_node(&next, "a1").unwrap()));
        check_unique_ids(&next).unwrap();
    }

    #[test]
    fn test_move_node_rejects_cycles() {
        let root = sample();
        assert_eq!(try_move_node(&root, "a", "a1", "children", 0), Err(TreeError::CycleDetected));
        assert_eq!(try_move_node(&root, "a", "a", "children", 0), Err(TreeError::CycleDetected));
        assert!(Arc::ptr_eq(&root, &move_node(&root, "a", "a2", "children", 0)));
    }

    #[test]
    fn test_find_parent() {
        let root = sample();
        let location = find_parent(&root, "a2").unwrap();
        assert_eq!(location.parent.id, "a");
        assert_eq!(location.slot, "children");
        assert_eq!(location.index, 1);
        assert!(find_parent(&root, "root").is_none());
    }

    #[test]
    fn test_duplicate_node() {
        let root = sample();
        let mut ids = IdGenerator::sequential("copy");
        let (next, copy_id) = try_duplicate_node(&root, "a", &mut ids).unwrap();

        assert_eq!(copy_id, "copy-1");
        assert_eq!(child_ids(&next, "root"), vec!["a", "copy-1", "b"]);
        assert_eq!(child_ids(&next, "copy-1"), vec!["copy-2", "copy-3"]);
        assert_eq!(get_node(&next, "copy-3").unwrap().prop_str("content"), Some("a2"));
        check_unique_ids(&next).unwrap();
    }

    #[test]
    fn test_check_unique_ids() {
        let tree = BlockNode::new("PageLayout", "root")
            .with_child("children", text("x"))
            .with_child("children", text("x"));
        assert_eq!(check_unique_ids(&tree), Err(TreeError::DuplicateId("x".into())));
    }
}
