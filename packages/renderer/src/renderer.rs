use crate::data::{DataResolver, NoExternalData};
use crate::dispatch::{RenderFunctions, RenderScope};
use crate::options::{RenderMode, RenderOptions};
use crate::overlay::EditorOverlay;
use crate::vdom::{RenderedDocument, VNode};
use blockwork_expression::Args;
use blockwork_model::{BlockNode, Document};
use blockwork_schema::{FallbackTranslator, SchemaRegistry, Translator};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

static FALLBACK_TRANSLATOR: FallbackTranslator = FallbackTranslator;
static NO_EXTERNAL_DATA: NoExternalData = NoExternalData;

/// Result of rendering a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderOutcome {
    Page(RenderedDocument),
    /// A reader render hit a redirect block; the page itself is discarded
    Redirect { url: String, permanent: bool },
}

impl RenderOutcome {
    pub fn page(&self) -> Option<&RenderedDocument> {
        match self {
            RenderOutcome::Page(doc) => Some(doc),
            RenderOutcome::Redirect { .. } => None,
        }
    }

    pub fn into_page(self) -> Option<RenderedDocument> {
        match self {
            RenderOutcome::Page(doc) => Some(doc),
            RenderOutcome::Redirect { .. } => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, RenderOutcome::Redirect { .. })
    }
}

/// Renders block trees to virtual DOM
///
/// Collaborators are borrowed for the renderer's lifetime. A reader renderer
/// never holds an overlay; [`Renderer::editor`] is the only way one is attached.
pub struct Renderer<'a> {
    registry: &'a SchemaRegistry,
    functions: RenderFunctions,
    options: RenderOptions,
    mode: RenderMode,
    translator: &'a dyn Translator,
    data: &'a dyn DataResolver,
    overlay: Option<&'a dyn EditorOverlay>,
}

impl<'a> Renderer<'a> {
    /// Reader-mode renderer with the built-in render functions
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            functions: RenderFunctions::builtin(),
            options: RenderOptions::default(),
            mode: RenderMode::Reader,
            translator: &FALLBACK_TRANSLATOR,
            data: &NO_EXTERNAL_DATA,
            overlay: None,
        }
    }

    /// Editor-mode renderer decorating every block through `overlay`
    pub fn editor(registry: &'a SchemaRegistry, overlay: &'a dyn EditorOverlay) -> Self {
        let mut renderer = Self::new(registry);
        renderer.mode = RenderMode::Editor;
        renderer.overlay = Some(overlay);
        renderer
    }

    pub fn with_functions(mut self, functions: RenderFunctions) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_translator(mut self, translator: &'a dyn Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_data(mut self, data: &'a dyn DataResolver) -> Self {
        self.data = data;
        self
    }

    pub fn functions_mut(&mut self) -> &mut RenderFunctions {
        &mut self.functions
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    pub fn functions(&self) -> &RenderFunctions {
        &self.functions
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator
    }

    pub fn data(&self) -> &dyn DataResolver {
        self.data
    }

    pub(crate) fn overlay(&self) -> Option<&dyn EditorOverlay> {
        self.overlay
    }

    /// Render a tree depth-first from `root`
    #[instrument(skip(self, root, args), fields(root_id = %root.id, mode = ?self.mode))]
    pub fn render(&self, root: &BlockNode, args: &Args) -> RenderOutcome {
        let mut scope = RenderScope::new(self);
        let nodes = scope.render_block(root, args);

        if let Some((url, permanent)) = scope.take_redirect() {
            debug!(url = %url, permanent, "Render redirected");
            return RenderOutcome::Redirect { url, permanent };
        }

        let styles = scope.take_styles();
        debug!(nodes = nodes.len(), rules = styles.len(), "Render complete");
        RenderOutcome::Page(RenderedDocument { nodes, styles })
    }

    pub fn render_document(&self, document: &Document, args: &Args) -> RenderOutcome {
        self.render(&document.root, args)
    }

    /// Render one block in isolation, ignoring redirects
    pub fn render_block(&self, block: &BlockNode, args: &Args) -> Vec<VNode> {
        RenderScope::new(self).render_block(block, args)
    }
}
