//! Render dispatch
//!
//! Each block kind maps to one render function. Functions receive the block
//! with its resolved style and the current arguments, and recurse into their
//! slots through the [`RenderScope`].

use crate::blocks;
use crate::data::DataResolver;
use crate::options::{RenderMode, RenderOptions};
use crate::renderer::Renderer;
use crate::vdom::VNode;
use blockwork_expression::{interpolate, Args, ValueExt};
use blockwork_model::{BlockKind, BlockNode, Props};
use blockwork_schema::i18n::{self, Params};
use blockwork_schema::SchemaRegistry;
use blockwork_style::{css_rules, resolve, CssRule, ResolveOptions, ResolvedStyle};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error};

pub type RenderFn = fn(&BlockInput<'_>, &mut RenderScope<'_>) -> Vec<VNode>;

/// Block kind → render function
#[derive(Debug, Clone, Default)]
pub struct RenderFunctions {
    functions: HashMap<BlockKind, RenderFn>,
}

impl RenderFunctions {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A render function for every built-in kind
    pub fn builtin() -> Self {
        let mut functions = Self::empty();
        for kind in BlockKind::BUILTIN {
            if let Some(f) = builtin_function(&kind) {
                functions.insert(kind, f);
            }
        }
        functions
    }

    pub fn register(mut self, kind: impl Into<BlockKind>, f: RenderFn) -> Self {
        self.insert(kind.into(), f);
        self
    }

    pub fn insert(&mut self, kind: BlockKind, f: RenderFn) {
        debug!(block_type = %kind, "Registering render function");
        self.functions.insert(kind, f);
    }

    pub fn remove(&mut self, kind: &BlockKind) -> Option<RenderFn> {
        self.functions.remove(kind)
    }

    pub fn get(&self, kind: &BlockKind) -> Option<RenderFn> {
        self.functions.get(kind).copied()
    }

    pub fn contains(&self, kind: &BlockKind) -> bool {
        self.functions.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn builtin_function(kind: &BlockKind) -> Option<RenderFn> {
    let f: RenderFn = match kind {
        BlockKind::PageLayout => blocks::page_layout,
        BlockKind::Container => blocks::container,
        BlockKind::Columns => blocks::columns,
        BlockKind::Column => blocks::column,
        BlockKind::Heading => blocks::heading,
        BlockKind::Text => blocks::text,
        BlockKind::InlineText => blocks::inline_text,
        BlockKind::Image => blocks::image,
        BlockKind::Button => blocks::button,
        BlockKind::Link => blocks::link,
        BlockKind::Spacer => blocks::spacer,
        BlockKind::Accordion => blocks::accordion,
        BlockKind::AccordionItem => blocks::accordion_item,
        BlockKind::ForeachContainer => blocks::foreach_container,
        BlockKind::ConditionalContainer => blocks::conditional_container,
        BlockKind::Redirect => blocks::redirect,
        BlockKind::CustomHtml => blocks::custom_html,
        BlockKind::Form => blocks::form,
        BlockKind::Unknown(_) => return None,
    };
    Some(f)
}

/// What a render function gets to see of its block
pub struct BlockInput<'a> {
    pub block: &'a BlockNode,
    pub props: &'a Props,
    pub style: ResolvedStyle,
    pub args: &'a Args,
    pub mode: RenderMode,
    inline_styles: bool,
}

impl<'a> BlockInput<'a> {
    pub fn new(block: &'a BlockNode, style: ResolvedStyle, args: &'a Args, mode: RenderMode) -> Self {
        Self {
            block,
            props: &block.data.props,
            style,
            args,
            mode,
            inline_styles: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.block.id
    }

    /// String prop with `{{ }}` bindings interpolated; empty when absent
    pub fn text(&self, name: &str) -> String {
        match self.props.get(name) {
            Some(Value::String(template)) => interpolate(template, self.args),
            Some(value) => value.to_display_string(),
            None => String::new(),
        }
    }

    pub fn raw_str(&self, name: &str) -> Option<&'a str> {
        self.props.get(name).and_then(Value::as_str)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.props.get(name).map_or(false, |v| v.is_truthy())
    }

    /// Root element of this block: identity, base attributes and style
    pub fn element(&self, tag: &str) -> VNode {
        let mut node = VNode::element(tag)
            .with_block_id(self.block.id.as_str())
            .with_key(self.block.id.as_str());

        if let Some(id) = self.block.html_id() {
            node = node.with_attr("id", id);
        }
        if let Some(class_name) = self.block.class_name() {
            node = node.with_class(class_name);
        }

        if self.inline_styles {
            for (property, value) in self.style.iter() {
                node = node.with_style(property, value);
            }
        } else {
            node = node.with_class(&style_class(&self.block.id));
        }
        node
    }
}

/// Class carrying a block's stylesheet rules
pub fn style_class(block_id: &str) -> String {
    let ident: String = block_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("bw-{}", ident)
}

/// State of one render pass
pub struct RenderScope<'r> {
    renderer: &'r Renderer<'r>,
    redirect: Option<(String, bool)>,
    styles: Vec<CssRule>,
    styled: HashSet<String>,
}

impl<'r> RenderScope<'r> {
    pub(crate) fn new(renderer: &'r Renderer<'r>) -> Self {
        Self {
            renderer,
            redirect: None,
            styles: Vec::new(),
            styled: HashSet::new(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.renderer.mode()
    }

    pub fn options(&self) -> &RenderOptions {
        self.renderer.options()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.renderer.registry()
    }

    pub fn data(&self) -> &dyn DataResolver {
        self.renderer.data()
    }

    /// Translate a key under the engine namespace
    pub fn translate(&self, suffix: &str, params: &Params) -> String {
        self.renderer.translator().translate(&i18n::key(suffix), params)
    }

    pub fn placeholder(&self, block: &BlockNode, suffix: &str, params: &Params) -> VNode {
        VNode::placeholder(self.translate(suffix, params), Some(block.id.clone()))
    }

    /// Ask the page to redirect. The first request wins.
    pub fn redirect(&mut self, url: String, permanent: bool) {
        if self.redirect.is_none() {
            self.redirect = Some((url, permanent));
        }
    }

    pub(crate) fn take_redirect(&mut self) -> Option<(String, bool)> {
        self.redirect.take()
    }

    pub(crate) fn take_styles(&mut self) -> Vec<CssRule> {
        std::mem::take(&mut self.styles)
    }

    /// Render one slot's children in order. Each child renders on its own, so
    /// a failing child never hides its siblings.
    pub fn render_slot(&mut self, block: &BlockNode, slot: &str, args: &Args) -> Vec<VNode> {
        let children = block.slot(slot);
        if children.is_empty() {
            return match (self.mode(), self.renderer.overlay()) {
                (RenderMode::Editor, Some(overlay)) => overlay.empty_slot(block, slot).into_iter().collect(),
                _ => Vec::new(),
            };
        }
        children
            .iter()
            .flat_map(|child| self.render_block(child, args))
            .collect()
    }

    pub fn render_block(&mut self, block: &BlockNode, args: &Args) -> Vec<VNode> {
        let renderer = self.renderer;
        let mode = renderer.mode();
        let kind = block.kind();

        let Some(render) = renderer.functions().get(&kind) else {
            error!(block_id = %block.id, block_type = %block.block_type, "No render function for block type");
            return match mode {
                RenderMode::Reader => Vec::new(),
                RenderMode::Editor => vec![self.placeholder(
                    block,
                    "placeholder.missing-block",
                    &i18n::params([("type", json!(block.block_type))]),
                )],
            };
        };

        let is_editor = mode.is_editor();
        let defaults = renderer.registry().default_styles(block, is_editor);
        let style = resolve(
            &block.data.style,
            &defaults,
            &ResolveOptions {
                breakpoint: renderer.options().breakpoint,
                state: None,
                is_editor,
            },
        );

        let mut input = BlockInput::new(block, style, args, mode);
        input.inline_styles = !renderer.options().emit_css;
        let nodes = render(&input, self);

        if renderer.options().emit_css
            && nodes
                .iter()
                .any(|n| matches!(n, VNode::Element { .. }) && n.block_id() == Some(block.id.as_str()))
            && self.styled.insert(block.id.clone())
        {
            let selector = format!(".{}", style_class(&block.id));
            self.styles.extend(css_rules(&selector, &block.data.style, &defaults));
        }

        match (mode, renderer.overlay()) {
            (RenderMode::Editor, Some(overlay)) => overlay.decorate(block, nodes),
            _ => nodes,
        }
    }
}
