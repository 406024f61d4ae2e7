//! Schema registry
//!
//! Maps each block type to its data schema, default value, placement rules
//! and default styles.

pub mod builtin;
pub mod capability;
pub mod field;
pub mod i18n;
pub mod registry;

pub use builtin::{heading_font_size, CONTENT_SLOT, DEFAULT_ITEM_NAME};
pub use capability::{AllowPredicate, Capability, SlotSpec};
pub use field::{is_allowed_url, FieldError, FieldKind, FieldSchema, ObjectSchema, ValidationErrors};
pub use i18n::{FallbackTranslator, Params, Translator};
pub use registry::{BlockIssue, DefaultStyleFn, InsertRejection, SchemaEntry, SchemaRegistry};
