//! Editor affordances layered over rendered blocks
//!
//! Marks every block's outermost element with its id, type and interaction
//! state so a host can wire up clicks and drag and drop, and fills empty
//! container slots with drop zones.

use crate::post_effects::FieldErrors;
use crate::state::{BlockInteraction, EditorState};
use blockwork_model::BlockNode;
use blockwork_renderer::{EditorOverlay, VNode};
use blockwork_schema::{i18n, Params, Translator};

pub struct EditorAffordances<'a> {
    state: &'a EditorState,
    field_errors: &'a FieldErrors,
    translator: &'a dyn Translator,
    root_id: &'a str,
}

impl<'a> EditorAffordances<'a> {
    pub fn new(
        state: &'a EditorState,
        field_errors: &'a FieldErrors,
        translator: &'a dyn Translator,
        root_id: &'a str,
    ) -> Self {
        Self {
            state,
            field_errors,
            translator,
            root_id,
        }
    }

    fn annotate(&self, block: &BlockNode, node: VNode) -> VNode {
        let interaction = self.state.interaction(&block.id);
        let mut node = node
            .with_attr("data-block-id", block.id.clone())
            .with_attr("data-block-type", block.block_type.clone())
            .with_attr("data-interaction", interaction.as_str());

        if block.id != self.root_id {
            node = node.with_attr("draggable", "true");
        }
        match interaction {
            BlockInteraction::Selected => node = node.with_class("bw-selected"),
            BlockInteraction::Dragging => node = node.with_class("bw-dragging"),
            BlockInteraction::Unselected => {}
        }
        if self.field_errors.get(&block.id).is_some_and(|errors| !errors.is_empty()) {
            node = node.with_attr("data-invalid", "true");
        }
        node
    }
}

impl EditorOverlay for EditorAffordances<'_> {
    fn decorate(&self, block: &BlockNode, rendered: Vec<VNode>) -> Vec<VNode> {
        rendered
            .into_iter()
            .map(|node| match node {
                VNode::Element { .. } => self.annotate(block, node),
                // placeholders get a selectable frame
                VNode::Placeholder { .. } => {
                    let frame = VNode::element("div")
                        .with_class("bw-frame")
                        .with_block_id(block.id.clone())
                        .with_child(node);
                    self.annotate(block, frame)
                }
                other => other,
            })
            .collect()
    }

    fn empty_slot(&self, parent: &BlockNode, slot: &str) -> Option<VNode> {
        let message = self
            .translator
            .translate(&i18n::key("placeholder.empty-slot"), &Params::new());
        Some(
            VNode::element("div")
                .with_class("bw-drop-zone")
                .with_attr("data-parent-id", parent.id.clone())
                .with_attr("data-slot", slot)
                .with_child(VNode::placeholder(message, None)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockwork_schema::FallbackTranslator;

    #[test]
    fn test_selected_block_is_marked() {
        let mut state = EditorState::new();
        state.select("t");
        let errors = FieldErrors::new();
        let affordances = EditorAffordances::new(&state, &errors, &FallbackTranslator, "root");

        let block = BlockNode::new("Text", "t");
        let out = affordances.decorate(&block, vec![VNode::element("p").with_block_id("t")]);

        assert_eq!(out[0].attr("data-block-id"), Some("t"));
        assert_eq!(out[0].attr("data-interaction"), Some("selected"));
        assert_eq!(out[0].attr("draggable"), Some("true"));
        assert_eq!(out[0].attr("class"), Some("bw-selected"));
    }

    #[test]
    fn test_root_is_not_draggable() {
        let state = EditorState::new();
        let errors = FieldErrors::new();
        let affordances = EditorAffordances::new(&state, &errors, &FallbackTranslator, "root");

        let block = BlockNode::new("PageLayout", "root");
        let out = affordances.decorate(&block, vec![VNode::element("main")]);
        assert_eq!(out[0].attr("draggable"), None);
    }

    #[test]
    fn test_empty_slot_drop_zone() {
        let state = EditorState::new();
        let errors = FieldErrors::new();
        let affordances = EditorAffordances::new(&state, &errors, &FallbackTranslator, "root");

        let zone = affordances
            .empty_slot(&BlockNode::new("Container", "c"), "children")
            .unwrap();
        assert_eq!(zone.attr("data-parent-id"), Some("c"));
        assert!(matches!(
            &zone.children()[0],
            VNode::Placeholder { message, .. } if message == "Drop blocks here"
        ));
    }
}
