use crate::vdom::VNode;
use blockwork_model::BlockNode;

/// Editor-only decoration of rendered blocks
///
/// The renderer calls this after a block has rendered, and only in editor
/// mode. Reader renders never reach an overlay.
pub trait EditorOverlay {
    fn decorate(&self, block: &BlockNode, rendered: Vec<VNode>) -> Vec<VNode>;

    /// Shown inside a container slot with no children
    fn empty_slot(&self, _parent: &BlockNode, _slot: &str) -> Option<VNode> {
        None
    }
}
