//! # Blockwork Expressions
//!
//! Binding expressions used by page-builder blocks: `{{ customer.name }}` in
//! text, `items` as a foreach source, `total > 100 && vip` as a condition.
//!
//! The language is deliberately small: dotted and indexed paths, literals,
//! arithmetic, comparison and logical operators. It can only read the
//! [`Args`] context it is given.
//!
//! ```rust
//! use blockwork_expression::{evaluate, interpolate, Args};
//! use serde_json::json;
//!
//! let args = Args::from_value(json!({ "customer": { "name": "Ada" } }));
//! assert_eq!(interpolate("Hi {{customer.name}}", &args), "Hi Ada");
//! assert_eq!(evaluate("missing.path", &args), serde_json::Value::Null);
//! ```

pub mod args;
pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

#[cfg(feature = "pretty-errors")]
mod pretty;

pub use args::Args;
pub use ast::{BinaryOp, Expression, UnaryOp};
pub use error::{ExpressionError, ExpressionResult, ParseError, ParseResult};
pub use eval::{binding_expression, evaluate, has_bindings, interpolate, try_evaluate};
pub use parser::parse;
pub use value::ValueExt;

#[cfg(feature = "pretty-errors")]
pub use pretty::format_parse_error;
