//! Undo/redo history
//!
//! History keeps whole tree versions rather than inverse operations. Tree
//! versions share every untouched subtree, so a snapshot costs one `Arc` per
//! block on the edited path.

use blockwork_model::BlockNode;
use std::sync::Arc;

/// One undo step: the root as it was before the step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub root: Arc<BlockNode>,
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(root: Arc<BlockNode>) -> Self {
        Self {
            root,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_levels: usize,
    current_batch: Option<HistoryEntry>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record that the tree is about to change from `before`
    ///
    /// Inside a batch only the first change counts: the batch undoes to the
    /// root it started from.
    pub fn record(&mut self, before: Arc<BlockNode>, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            if batch.description.is_none() {
                batch.description = Some(description.into());
            }
            return;
        }
        self.push_entry(HistoryEntry::new(before).with_description(description));
    }

    /// Start grouping changes into one undo step
    pub fn begin_batch(&mut self, current: Arc<BlockNode>) {
        if self.current_batch.is_none() {
            self.current_batch = Some(HistoryEntry::new(current));
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    /// Close the batch. A batch that changed nothing leaves no entry.
    pub fn end_batch(&mut self, current: &Arc<BlockNode>) {
        if let Some(batch) = self.current_batch.take() {
            if !Arc::ptr_eq(&batch.root, current) {
                self.push_entry(batch);
            }
        }
    }

    pub fn in_batch(&self) -> bool {
        self.current_batch.is_some()
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Step back from `current`; returns the root to restore
    pub fn undo(&mut self, current: Arc<BlockNode>) -> Option<Arc<BlockNode>> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            root: current,
            description: entry.description.clone(),
        });
        Some(entry.root)
    }

    /// Step forward from `current`; returns the root to restore
    pub fn redo(&mut self, current: Arc<BlockNode>) -> Option<Arc<BlockNode>> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            root: current,
            description: entry.description.clone(),
        });
        Some(entry.root)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last()?.description.as_deref()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last()?.description.as_deref()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(text: &str) -> Arc<BlockNode> {
        Arc::new(BlockNode::new("PageLayout", "root").with_prop("title", text))
    }

    #[test]
    fn test_undo_redo() {
        let mut stack = UndoStack::new();
        let v1 = version("one");
        let v2 = version("two");

        stack.record(v1.clone(), "rename");
        assert_eq!(stack.undo_description(), Some("rename"));

        let restored = stack.undo(v2.clone()).unwrap();
        assert!(Arc::ptr_eq(&restored, &v1));
        assert!(stack.can_redo());

        let again = stack.redo(restored).unwrap();
        assert!(Arc::ptr_eq(&again, &v2));
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut stack = UndoStack::new();
        stack.record(version("one"), "a");
        stack.undo(version("two"));
        assert!(stack.can_redo());

        stack.record(version("one"), "b");
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_batch_is_one_step() {
        let mut stack = UndoStack::new();
        let start = version("start");

        stack.begin_batch(start.clone());
        stack.record(start.clone(), "first");
        stack.record(version("middle"), "second");
        stack.end_batch(&version("end"));

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("first"));
        assert!(Arc::ptr_eq(&stack.undo(version("end")).unwrap(), &start));
    }

    #[test]
    fn test_empty_batch_leaves_no_entry() {
        let mut stack = UndoStack::new();
        let start = version("start");
        stack.begin_batch(start.clone());
        stack.end_batch(&start);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_max_levels() {
        let mut stack = UndoStack::with_max_levels(2);
        for i in 0..5 {
            stack.record(version(&i.to_string()), format!("step {i}"));
        }
        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo_description(), Some("step 4"));
    }
}
