//! Error types for the block tree

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Slot '{slot}' not found on block {parent_id}")]
    SlotNotFound { parent_id: String, slot: String },

    #[error("Index {index} out of bounds for slot '{slot}' (len {len})")]
    IndexOutOfBounds { slot: String, index: usize, len: usize },

    #[error("Duplicate block id: {0}")]
    DuplicateId(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("The root block cannot be removed or moved")]
    RootImmutable,
}

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
