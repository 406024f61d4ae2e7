use crate::block::BlockNode;
use std::sync::Arc;

/// Read-only traversal over a block tree
///
/// The default methods walk every slot in name order. Override `visit_block`
/// or `visit_slot` and call the matching `walk_*` function to keep descending.
pub trait Visitor: Sized {
    fn visit_block(&mut self, block: &BlockNode) {
        walk_block(self, block);
    }

    fn visit_slot(&mut self, _parent: &BlockNode, _name: &str, children: &[Arc<BlockNode>]) {
        walk_slot(self, children);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &BlockNode) {
    for (name, children) in &block.slots {
        visitor.visit_slot(block, name, children);
    }
}

pub fn walk_slot<V: Visitor>(visitor: &mut V, children: &[Arc<BlockNode>]) {
    for child in children {
        visitor.visit_block(child);
    }
}
