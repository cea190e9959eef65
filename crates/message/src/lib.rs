//! ICU-style message templates: parsing and locale-aware rendering.
//! ICU 風格訊息樣板：解析與依語系渲染。
//!
//! ```
//! use msgfmt_message::{parse, Arguments};
//!
//! let root = parse("{n, plural, =0 {No emails.} =1 {One email.} other {{n} emails.}}").unwrap();
//! let args = Arguments::new().with("n", 10);
//! assert_eq!(root.render("en_US", &args).unwrap(), "10 emails.");
//! ```

pub mod parser;
pub mod render;
pub mod tree;
pub mod value;

pub use msgfmt_plural::PluralCategory;
pub use parser::{parse, SyntaxError};
pub use render::{render, ArgumentKind, RenderError, Renderer};
pub use tree::{Gender, Message, Plural, Root, Select, Variable};
pub use value::{Arguments, Number, Value};

use thiserror::Error;

/// Either half of [`format`] failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Parses and renders in one step.
///
/// Prefer [`parse`] once and [`Root::render`] many times when the same
/// template is rendered repeatedly.
pub fn format(template: &str, locale: &str, args: &Arguments) -> Result<String, MessageError> {
    let root = parse(template)?;
    Ok(render(&root, locale, args)?)
}
