//! Selection and drag state
//!
//! A block is in exactly one interaction state at a time. At most one block is
//! selected and at most one is being dragged.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockInteraction {
    #[default]
    Unselected,
    Selected,
    Dragging,
}

impl BlockInteraction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockInteraction::Unselected => "unselected",
            BlockInteraction::Selected => "selected",
            BlockInteraction::Dragging => "dragging",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    selected: Option<String>,
    dragging: Option<String>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interaction(&self, block_id: &str) -> BlockInteraction {
        if self.dragging.as_deref() == Some(block_id) {
            BlockInteraction::Dragging
        } else if self.selected.as_deref() == Some(block_id) {
            BlockInteraction::Selected
        } else {
            BlockInteraction::Unselected
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Selecting one block deselects any other
    pub fn select(&mut self, block_id: impl Into<String>) {
        self.selected = Some(block_id.into());
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Dragging a block also selects it
    pub fn begin_drag(&mut self, block_id: impl Into<String>) {
        let block_id = block_id.into();
        self.selected = Some(block_id.clone());
        self.dragging = Some(block_id);
    }

    /// Returns the block that was being dragged
    pub fn end_drag(&mut self) -> Option<String> {
        self.dragging.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_exclusive() {
        let mut state = EditorState::new();
        state.select("a");
        state.select("b");
        assert_eq!(state.interaction("a"), BlockInteraction::Unselected);
        assert_eq!(state.interaction("b"), BlockInteraction::Selected);
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut state = EditorState::new();
        state.begin_drag("a");
        assert_eq!(state.interaction("a"), BlockInteraction::Dragging);
        assert_eq!(state.end_drag().as_deref(), Some("a"));
        assert_eq!(state.interaction("a"), BlockInteraction::Selected);
        assert!(!state.is_dragging());
    }
}
