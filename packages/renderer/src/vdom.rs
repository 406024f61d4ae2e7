use blockwork_style::CssRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// HTML element
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        styles: BTreeMap<String, String>,
        children: Vec<VNode>,
        /// Block this element was rendered for
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        /// Reconciliation key; differs from the block id inside repeats
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },

    /// Text node
    Text { content: String },

    /// Comment node
    Comment { content: String },

    /// Markup inserted without escaping
    Raw { html: String },

    /// Stand-in shown where a block could not render
    Placeholder {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
    },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            children: Vec::new(),
            block_id: None,
            key: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        VNode::Comment {
            content: content.into(),
        }
    }

    pub fn raw(html: impl Into<String>) -> Self {
        VNode::Raw { html: html.into() }
    }

    pub fn placeholder(message: impl Into<String>, block_id: Option<String>) -> Self {
        VNode::Placeholder {
            message: message.into(),
            block_id,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Append to the `class` attribute
    pub fn with_class(mut self, class: &str) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            let classes = attributes.entry("class".to_string()).or_default();
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element { ref mut styles, .. } = self {
            styles.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn with_block_id(mut self, id: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut block_id, ..
        } = self
        {
            *block_id = Some(id.into());
        }
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if let VNode::Element {
            key: ref mut node_key,
            ..
        } = self
        {
            *node_key = Some(key.into());
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn block_id(&self) -> Option<&str> {
        match self {
            VNode::Element { block_id, .. } | VNode::Placeholder { block_id, .. } => block_id.as_deref(),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            VNode::Text { content } => out.push_str(content),
            VNode::Element { children, .. } => children.iter().for_each(|c| c.collect_text(out)),
            _ => {}
        }
    }

    /// Depth-first iterator over this node and its descendants
    pub fn descendants(&self) -> Vec<&VNode> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.descendants());
        }
        out
    }
}

/// Rendered page: root nodes plus the stylesheet they reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub nodes: Vec<VNode>,
    pub styles: Vec<CssRule>,
}

impl RenderedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: VNode) {
        self.nodes.push(node);
    }

    /// Every node of the document, depth-first
    pub fn all_nodes(&self) -> Vec<&VNode> {
        self.nodes.iter().flat_map(VNode::descendants).collect()
    }

    /// Contents of every text node in document order
    pub fn texts(&self) -> Vec<&str> {
        self.all_nodes()
            .into_iter()
            .filter_map(|node| match node {
                VNode::Text { content } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn find_block(&self, block_id: &str) -> Option<&VNode> {
        self.all_nodes()
            .into_iter()
            .find(|node| node.block_id() == Some(block_id))
    }
}
