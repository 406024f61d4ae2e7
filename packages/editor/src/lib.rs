//! # Blockwork Editor
//!
//! Interactive editing of block documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: clicks, drags, field input, timers    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Actions checked against the registry     │
//! │  - Selection and drag state                 │
//! │  - Debounced field commits                  │
//! │  - Snapshot undo/redo                       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: editor mode + affordances → VDOM  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use blockwork_editor::{DispatchOutcome, EditSession};
//! use blockwork_model::{Document, CHILDREN_SLOT};
//! use blockwork_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builtin();
//! let mut session = EditSession::new(&registry, Document::empty());
//! let root_id = session.value().root.id.clone();
//!
//! let outcome = session.insert_block(&root_id, CHILDREN_SLOT, 0, "Heading");
//! assert_eq!(outcome, DispatchOutcome::Applied);
//! assert_eq!(session.value().block_count(), 2);
//!
//! session.undo();
//! assert_eq!(session.value().block_count(), 1);
//! ```

mod actions;
mod affordances;
mod debounce;
mod errors;
mod post_effects;
mod session;
mod state;
mod undo_stack;

pub use actions::Action;
pub use affordances::EditorAffordances;
pub use debounce::Debouncer;
pub use errors::{ActionError, EditorError};
pub use post_effects::{
    CancelStaleDrag, ClearStaleSelection, DropOrphanedEdits, EffectContext, FieldErrors, FieldKey,
    PostEffect, PostEffectEngine, PruneFieldErrors, SelectInserted,
};
pub use session::{DispatchOutcome, EditSession, SessionOptions};
pub use state::{BlockInteraction, EditorState};
pub use undo_stack::{HistoryEntry, UndoStack};
