pub mod init;
pub mod render;
pub mod schema;
pub mod validate;

pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use schema::{schema, SchemaArgs};
pub use validate::{validate, ValidateArgs};
