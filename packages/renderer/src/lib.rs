//! # Blockwork Renderer
//!
//! Turns a block tree into a virtual DOM, in reader mode for published pages
//! or in editor mode with an [`EditorOverlay`] layering selection and drag
//! affordances over the same render path.
//!
//! ```rust
//! use blockwork_expression::Args;
//! use blockwork_model::Document;
//! use blockwork_renderer::{to_html, Renderer};
//! use blockwork_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builtin();
//! let doc = Document::from_json(r#"{
//!     "id": "root", "type": "PageLayout",
//!     "slots": { "children": [
//!         { "id": "t", "type": "Text", "data": { "props": { "content": "Hello {{ name }}" } } }
//!     ] }
//! }"#).unwrap();
//!
//! let args = Args::from_value(serde_json::json!({ "name": "Ada" }));
//! let page = Renderer::new(&registry).render_document(&doc, &args).into_page().unwrap();
//! assert!(to_html(&page).contains("Hello Ada"));
//! ```

mod blocks;
pub mod data;
pub mod dispatch;
pub mod html;
pub mod options;
pub mod overlay;
pub mod renderer;
pub mod vdom;

pub use data::{DataResolver, ExternalDataError, FormDefinition, FormField, NoExternalData};
#[cfg(feature = "async")]
pub use data::{collect_form_ids, prefetch, prefetch_with_timeout, AsyncDataResolver, PrefetchedData};
pub use dispatch::{style_class, BlockInput, RenderFn, RenderFunctions, RenderScope};
pub use html::{escape_html, to_html, to_html_with, HtmlOptions};
pub use options::{RawHtmlPolicy, RenderMode, RenderOptions};
pub use overlay::EditorOverlay;
pub use renderer::{RenderOutcome, Renderer};
pub use vdom::{RenderedDocument, VNode};
