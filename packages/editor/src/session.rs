//! # Edit Session
//!
//! A controlled editor over one document. The session owns the current tree
//! version, selection and drag state, history and the debounced field edits.
//! Every change goes through [`EditSession::dispatch`]; the host observes new
//! versions through the `on_change` callback and may push its own with
//! [`EditSession::set_value`].

use crate::actions::Action;
use crate::affordances::EditorAffordances;
use crate::debounce::Debouncer;
use crate::errors::{ActionError, EditorError};
use crate::post_effects::{EffectContext, FieldErrors, FieldKey, PostEffectEngine};
use crate::state::EditorState;
use crate::undo_stack::UndoStack;
use blockwork_expression::Args;
use blockwork_model::{get_node, random_id, BlockKind, BlockNode, Document, IdGenerator};
use blockwork_renderer::{
    DataResolver, NoExternalData, RenderFunctions, RenderOptions, RenderOutcome, Renderer,
};
use blockwork_schema::{
    FallbackTranslator, InsertRejection, SchemaRegistry, Translator, ValidationErrors,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

static FALLBACK_TRANSLATOR: FallbackTranslator = FallbackTranslator;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Quiet period before a field edit is committed
    pub debounce: Duration,
    pub max_undo_levels: usize,
    pub render: RenderOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            max_undo_levels: 100,
            render: RenderOptions::default(),
        }
    }
}

/// What happened to a dispatched action
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Applied,
    /// Nothing to do: the target is gone or the result equals the current tree
    Unchanged,
    /// The placement rules refused the block
    Rejected(InsertRejection),
    /// The block data failed validation
    Invalid {
        block_id: String,
        errors: ValidationErrors,
    },
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied)
    }
}

type ChangeCallback<'r> = Box<dyn FnMut(&Document) + 'r>;

pub struct EditSession<'r> {
    /// Unique session identifier
    pub id: String,
    registry: &'r SchemaRegistry,
    translator: &'r dyn Translator,
    document: Document,
    state: EditorState,
    history: UndoStack,
    pending_edits: Debouncer<FieldKey, Value>,
    field_errors: FieldErrors,
    rejection: Option<InsertRejection>,
    ids: IdGenerator,
    effects: PostEffectEngine,
    on_change: Option<ChangeCallback<'r>>,
    options: SessionOptions,
}

impl<'r> EditSession<'r> {
    pub fn new(registry: &'r SchemaRegistry, document: Document) -> Self {
        Self::with_options(registry, document, SessionOptions::default())
    }

    pub fn with_options(registry: &'r SchemaRegistry, document: Document, options: SessionOptions) -> Self {
        Self {
            id: random_id(),
            registry,
            translator: &FALLBACK_TRANSLATOR,
            document,
            state: EditorState::new(),
            history: UndoStack::with_max_levels(options.max_undo_levels),
            pending_edits: Debouncer::new(options.debounce),
            field_errors: FieldErrors::new(),
            rejection: None,
            ids: IdGenerator::random(),
            effects: PostEffectEngine::new(),
            on_change: None,
            options,
        }
    }

    /// Open a document file for editing
    pub fn load(registry: &'r SchemaRegistry, path: impl AsRef<Path>) -> Result<Self, EditorError> {
        Ok(Self::new(registry, Document::load(path)?))
    }

    /// Commit pending edits and write the document
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        self.flush();
        self.document.save(path)?;
        Ok(())
    }

    pub fn with_translator(mut self, translator: &'r dyn Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_ids(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_effects(mut self, effects: PostEffectEngine) -> Self {
        self.effects = effects;
        self
    }

    /// Called with every new version the session produces
    pub fn on_change(mut self, callback: impl FnMut(&Document) + 'r) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn value(&self) -> &Document {
        &self.document
    }

    /// Adopt a version supplied by the host
    ///
    /// Not recorded in history and not echoed through `on_change`.
    pub fn set_value(&mut self, document: Document) {
        if Arc::ptr_eq(&document.root, &self.document.root) {
            return;
        }
        self.document = document;
        self.rejection = None;
        self.run_effects(None);
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    /// Apply one action
    #[instrument(skip(self, action), fields(session = %self.id, action = action.name()))]
    pub fn dispatch(&mut self, action: Action) -> DispatchOutcome {
        let before = self.document.root.clone();
        match action.apply(&before, self.registry, &mut self.ids) {
            Ok(next) if Arc::ptr_eq(&next, &before) => DispatchOutcome::Unchanged,
            Ok(next) => {
                if let Action::SetBlockData { block_id, .. } = &action {
                    self.field_errors.remove(block_id);
                }
                self.rejection = None;
                self.history.record(before, action.description());
                self.commit(next, Some(&action));
                DispatchOutcome::Applied
            }
            Err(ActionError::Rejected(rejection)) => {
                warn!(reason = %rejection, "Placement rejected");
                self.rejection = Some(rejection.clone());
                DispatchOutcome::Rejected(rejection)
            }
            Err(ActionError::Validation { block_id, errors }) => {
                debug!(block_id = %block_id, errors = errors.len(), "Block data invalid");
                self.field_errors.insert(block_id.clone(), errors.clone());
                DispatchOutcome::Invalid { block_id, errors }
            }
            Err(ActionError::Tree(e)) => {
                warn!(error = %e, "Action skipped");
                DispatchOutcome::Unchanged
            }
        }
    }

    /// Apply several actions as one step; either all apply or none do
    pub fn dispatch_all(
        &mut self,
        description: impl Into<String>,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<(), EditorError> {
        let before = self.document.root.clone();
        let mut next = before.clone();
        for action in actions {
            next = action.apply(&next, self.registry, &mut self.ids)?;
        }
        if !Arc::ptr_eq(&next, &before) {
            self.history.record(before, description);
            self.commit(next, None);
        }
        Ok(())
    }

    /// Group the following dispatches into one undo step
    pub fn begin_batch(&mut self) {
        self.history.begin_batch(self.document.root.clone());
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch(&self.document.root);
    }

    fn commit(&mut self, root: Arc<BlockNode>, action: Option<&Action>) {
        self.document = Document::new(root);
        self.run_effects(action);
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.document);
        }
    }

    fn run_effects(&mut self, action: Option<&Action>) {
        let mut ctx = EffectContext {
            state: &mut self.state,
            field_errors: &mut self.field_errors,
            pending_edits: &mut self.pending_edits,
        };
        self.effects.run(action, &self.document.root, &mut ctx);
    }

    // Selection

    /// Select `block_id`, deselecting anything else. Unknown ids are ignored.
    pub fn select(&mut self, block_id: &str) -> bool {
        if get_node(&self.document.root, block_id).is_none() {
            return false;
        }
        self.state.select(block_id);
        true
    }

    pub fn deselect(&mut self) {
        self.state.deselect();
    }

    pub fn selected(&self) -> Option<&BlockNode> {
        let id = self.state.selected()?;
        get_node(&self.document.root, id).map(|node| &**node)
    }

    // Drag and drop

    /// Start dragging a block. The root cannot be dragged.
    pub fn begin_drag(&mut self, block_id: &str) -> bool {
        if block_id == self.document.root.id || get_node(&self.document.root, block_id).is_none() {
            return false;
        }
        self.state.begin_drag(block_id);
        true
    }

    /// Drop the dragged block into `slot` of `parent_id`
    ///
    /// The move is a single action: the block is never missing from the tree
    /// or present twice, whatever the outcome.
    pub fn drop_into(&mut self, parent_id: &str, slot: &str, index: usize) -> DispatchOutcome {
        let Some(block_id) = self.state.end_drag() else {
            return DispatchOutcome::Unchanged;
        };
        self.dispatch(Action::MoveBlock {
            block_id,
            parent_id: parent_id.to_string(),
            slot: slot.to_string(),
            index,
        })
    }

    pub fn cancel_drag(&mut self) {
        self.state.end_drag();
    }

    // Field editing

    /// Queue a field edit; returns the token a host timer can pass to
    /// [`EditSession::commit_if_current`]
    pub fn edit_field(&mut self, block_id: &str, field: &str, value: Value, now: Instant) -> u64 {
        self.pending_edits
            .schedule((block_id.to_string(), field.to_string()), value, now)
    }

    /// The value a field shows: the pending edit, else the committed prop
    pub fn field_value(&self, block_id: &str, field: &str) -> Option<Value> {
        let key = (block_id.to_string(), field.to_string());
        if let Some(pending) = self.pending_edits.peek(&key) {
            return Some(pending.clone());
        }
        get_node(&self.document.root, block_id)?.prop(field).cloned()
    }

    /// Commit the edits whose quiet period has passed
    pub fn tick(&mut self, now: Instant) -> Vec<DispatchOutcome> {
        let due = self.pending_edits.take_due(now);
        self.commit_edits(due)
    }

    pub fn commit_if_current(&mut self, block_id: &str, field: &str, token: u64) -> Option<DispatchOutcome> {
        let key = (block_id.to_string(), field.to_string());
        let value = self.pending_edits.take_if_current(&key, token)?;
        Some(self.commit_edit(key, value))
    }

    /// Commit every pending edit now
    pub fn flush(&mut self) -> Vec<DispatchOutcome> {
        let pending = self.pending_edits.flush();
        self.commit_edits(pending)
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.pending_edits.is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending_edits.next_due()
    }

    fn commit_edits(&mut self, edits: Vec<(FieldKey, Value)>) -> Vec<DispatchOutcome> {
        edits
            .into_iter()
            .map(|(key, value)| self.commit_edit(key, value))
            .collect()
    }

    fn commit_edit(&mut self, (block_id, field): FieldKey, value: Value) -> DispatchOutcome {
        let Some(node) = get_node(&self.document.root, &block_id) else {
            debug!(block_id = %block_id, field = %field, "Dropping edit of removed block");
            return DispatchOutcome::Unchanged;
        };
        if node.prop(&field) == Some(&value) {
            return DispatchOutcome::Unchanged;
        }
        let mut props = node.data.props.clone();
        props.insert(field, value);
        self.dispatch(Action::SetBlockData { block_id, props })
    }

    pub fn field_errors(&self, block_id: &str) -> Option<&ValidationErrors> {
        self.field_errors.get(block_id)
    }

    /// Translated inline error for one field of a block
    pub fn field_error_message(&self, block_id: &str, field: &str) -> Option<String> {
        let path = format!("props.{}", field);
        let error = self.field_errors(block_id)?.for_path(&path).next()?;
        Some(error.message_with(self.translator))
    }

    // Insertion

    /// Block types that may go into `slot` of `parent_id`
    pub fn insertable_types(&self, parent_id: &str, slot: &str) -> Vec<BlockKind> {
        match get_node(&self.document.root, parent_id) {
            Some(parent) => self.registry.insertable_types(&parent.block_type, slot),
            None => Vec::new(),
        }
    }

    /// Insert a new block of `type_name` with its default value
    pub fn insert_block(&mut self, parent_id: &str, slot: &str, index: usize, type_name: &str) -> DispatchOutcome {
        let Some(block) = self.registry.create_block(type_name, &mut self.ids) else {
            let rejection = InsertRejection::UnknownChild(type_name.to_string());
            self.rejection = Some(rejection.clone());
            return DispatchOutcome::Rejected(rejection);
        };
        self.dispatch(Action::InsertChild {
            parent_id: parent_id.to_string(),
            slot: slot.to_string(),
            index,
            block,
        })
    }

    /// The last refused placement, until the next applied change
    pub fn last_rejection(&self) -> Option<&InsertRejection> {
        self.rejection.as_ref()
    }

    pub fn rejection_message(&self) -> Option<String> {
        self.rejection
            .as_ref()
            .map(|rejection| rejection.message_with(self.translator))
    }

    pub fn clear_rejection(&mut self) {
        self.rejection = None;
    }

    // History

    /// Pending edits are committed first, so they are what gets undone
    pub fn undo(&mut self) -> bool {
        self.flush();
        match self.history.undo(self.document.root.clone()) {
            Some(root) => {
                self.commit(root, None);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.flush();
        match self.history.redo(self.document.root.clone()) {
            Some(root) => {
                self.commit(root, None);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    // Rendering

    pub fn affordances(&self) -> EditorAffordances<'_> {
        EditorAffordances::new(
            &self.state,
            &self.field_errors,
            self.translator,
            &self.document.root.id,
        )
    }

    /// Render the current version in editor mode
    pub fn render(&self, args: &Args) -> RenderOutcome {
        self.render_with(args, RenderFunctions::builtin(), &NoExternalData)
    }

    pub fn render_with(
        &self,
        args: &Args,
        functions: RenderFunctions,
        data: &dyn DataResolver,
    ) -> RenderOutcome {
        let affordances = self.affordances();
        Renderer::editor(self.registry, &affordances)
            .with_functions(functions)
            .with_options(self.options.render.clone())
            .with_translator(self.translator)
            .with_data(data)
            .render_document(&self.document, args)
    }
}
