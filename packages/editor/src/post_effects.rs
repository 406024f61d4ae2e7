//! # Post-Effect System
//!
//! Every tree change (an applied action, an undo, a redo or an external value)
//! is followed by effects that keep the editor's own state consistent with the
//! new tree. Selection, drag, inline field errors and pending field edits can
//! all point at blocks that no longer exist.
//!
//! Effects only touch editor state, never the tree, and each effect is
//! independent of the others.

use crate::actions::Action;
use crate::debounce::Debouncer;
use crate::state::EditorState;
use blockwork_model::{get_node, BlockNode};
use blockwork_schema::ValidationErrors;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Inline validation errors, per block id
pub type FieldErrors = BTreeMap<String, ValidationErrors>;

/// `(block id, field name)`
pub type FieldKey = (String, String);

/// Editor state an effect may adjust
pub struct EffectContext<'a> {
    pub state: &'a mut EditorState,
    pub field_errors: &'a mut FieldErrors,
    pub pending_edits: &'a mut Debouncer<FieldKey, Value>,
}

pub trait PostEffect: std::fmt::Debug {
    /// `action` is `None` for history steps and external values
    fn apply(&self, action: Option<&Action>, root: &Arc<BlockNode>, ctx: &mut EffectContext<'_>);
}

fn exists(root: &Arc<BlockNode>, id: &str) -> bool {
    get_node(root, id).is_some()
}

#[derive(Debug)]
pub struct ClearStaleSelection;

impl PostEffect for ClearStaleSelection {
    fn apply(&self, _action: Option<&Action>, root: &Arc<BlockNode>, ctx: &mut EffectContext<'_>) {
        if let Some(id) = ctx.state.selected() {
            if !exists(root, id) {
                debug!(block_id = %id, "Clearing selection of removed block");
                ctx.state.deselect();
            }
        }
    }
}

#[derive(Debug)]
pub struct CancelStaleDrag;

impl PostEffect for CancelStaleDrag {
    fn apply(&self, _action: Option<&Action>, root: &Arc<BlockNode>, ctx: &mut EffectContext<'_>) {
        if let Some(id) = ctx.state.dragging() {
            if !exists(root, id) {
                debug!(block_id = %id, "Cancelling drag of removed block");
                ctx.state.end_drag();
            }
        }
    }
}

#[derive(Debug)]
pub struct PruneFieldErrors;

impl PostEffect for PruneFieldErrors {
    fn apply(&self, _action: Option<&Action>, root: &Arc<BlockNode>, ctx: &mut EffectContext<'_>) {
        ctx.field_errors.retain(|id, _| exists(root, id));
    }
}

#[derive(Debug)]
pub struct DropOrphanedEdits;

impl PostEffect for DropOrphanedEdits {
    fn apply(&self, _action: Option<&Action>, root: &Arc<BlockNode>, ctx: &mut EffectContext<'_>) {
        ctx.pending_edits.retain(|(id, _)| exists(root, id));
    }
}

/// A freshly inserted block becomes the selection
#[derive(Debug)]
pub struct SelectInserted;

impl PostEffect for SelectInserted {
    fn apply(&self, action: Option<&Action>, root: &Arc<BlockNode>, ctx: &mut EffectContext<'_>) {
        if let Some(Action::InsertChild { block, .. }) = action {
            if exists(root, &block.id) {
                ctx.state.select(block.id.clone());
            }
        }
    }
}

#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Engine with the default effects
    pub fn new() -> Self {
        Self {
            effects: vec![
                Box::new(ClearStaleSelection),
                Box::new(CancelStaleDrag),
                Box::new(PruneFieldErrors),
                Box::new(DropOrphanedEdits),
                Box::new(SelectInserted),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { effects: Vec::new() }
    }

    pub fn with_effect(mut self, effect: impl PostEffect + 'static) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    pub fn run(&self, action: Option<&Action>, root: &Arc<BlockNode>, ctx: &mut EffectContext<'_>) {
        for effect in &self.effects {
            effect.apply(action, root, ctx);
        }
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
