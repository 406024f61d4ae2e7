use blockwork_style::Breakpoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Reader,
    Editor,
}

impl RenderMode {
    pub fn is_editor(&self) -> bool {
        matches!(self, RenderMode::Editor)
    }
}

/// What to do with the markup of `CustomHTML` blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawHtmlPolicy {
    /// Insert as-is; authors are trusted
    #[default]
    Trust,
    /// Show the markup as text
    Escape,
    /// Leave it out
    Drop,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Active breakpoint for inline style resolution; `None` is the base layout
    pub breakpoint: Option<Breakpoint>,
    pub raw_html: RawHtmlPolicy,
    /// Emit a stylesheet with breakpoint and state rules instead of inline styles
    pub emit_css: bool,
}

impl RenderOptions {
    pub fn with_breakpoint(mut self, breakpoint: Option<Breakpoint>) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    pub fn with_raw_html(mut self, policy: RawHtmlPolicy) -> Self {
        self.raw_html = policy;
        self
    }

    pub fn with_css(mut self, emit_css: bool) -> Self {
        self.emit_css = emit_css;
        self
    }
}
