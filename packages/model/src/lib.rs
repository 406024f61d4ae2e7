//! Block tree model
//!
//! A document is a tree of typed blocks. Blocks own named slots of children,
//! held behind `Arc` so that every edit produces a new tree version that
//! shares all untouched subtrees with the previous one.

pub mod block;
pub mod document;
pub mod error;
pub mod id;
pub mod kind;
pub mod tree;
pub mod visitor;

pub use block::{BlockBase, BlockData, BlockNode, Props, Slots, CHILDREN_SLOT};
pub use document::{Document, ROOT_TYPE};
pub use error::{DocumentError, TreeError, TreeResult};
pub use id::{random_id, IdGenerator};
pub use kind::BlockKind;
pub use tree::{
    check_unique_ids, collect_ids, duplicate_node, find_parent, get_node, insert_child,
    move_child, move_node, remove_child, remove_node, replace_node, try_duplicate_node,
    try_insert_child, try_move_child, try_move_node, try_remove_child, try_remove_node,
    try_replace_node, ParentLocation,
};
pub use visitor::{walk_block, walk_slot, Visitor};
