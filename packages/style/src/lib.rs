//! # Blockwork Style
//!
//! Style maps attached to blocks and their resolution into concrete
//! CSS-like property values.
//!
//! A block's declared styles are an ordered list of declarations per
//! property, each optionally qualified by a breakpoint or an interaction
//! state. Resolution layers framework defaults, the block type's computed
//! defaults and the last matching declaration.

pub mod css;
pub mod declaration;
pub mod resolve;

pub use css::{css_rules, to_css_text, CssRule};
pub use declaration::{Breakpoint, StyleDeclaration, StyleMap, StyleState};
pub use resolve::{
    css_property_name, editor_defaults, framework_defaults, resolve, ResolveOptions, ResolvedStyle,
    StyleDefaults,
};
