//! Renders message trees for a locale.

use std::fmt;

use msgfmt_plural::{Operands, PluralRule};
use thiserror::Error;

use crate::tree::{Message, Plural, Root};
use crate::value::{Arguments, Number, Value};

/// What kind of value an argument needed to be.
/// 參數應有的值類型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// A number, or a string that parses as one.
    Number,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKind::Number => f.write_str("a number"),
        }
    }
}

/// Errors raised while rendering.
/// 渲染訊息時可能回傳的錯誤。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("missing argument '{0}'")]
    MissingArgument(String),
    #[error("argument '{name}' must be {expected}")]
    ArgumentType { name: String, expected: ArgumentKind },
    #[error("'{node}' cannot be rendered outside a plural branch")]
    UnsupportedNode { node: &'static str },
}

/// Renders `root` for `locale`.
///
/// Variables missing from `args` are written back as `{name}`; plural,
/// select and gender arguments are required.
pub fn render(root: &Root, locale: &str, args: &Arguments) -> Result<String, RenderError> {
    Renderer::new(locale).render(root, args)
}

/// Rendering with non-default options.
///
/// ```
/// use msgfmt_message::{parse, Arguments, RenderError, Renderer};
///
/// let root = parse("Hello {name}").unwrap();
/// let lenient = Renderer::new("en").render(&root, &Arguments::new()).unwrap();
/// assert_eq!(lenient, "Hello {name}");
///
/// let strict = Renderer::new("en").strict(true).render(&root, &Arguments::new());
/// assert_eq!(strict, Err(RenderError::MissingArgument("name".into())));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    rule: PluralRule,
    strict: bool,
}

impl Renderer {
    pub fn new(locale: &str) -> Self {
        Self {
            rule: PluralRule::for_locale(locale),
            strict: false,
        }
    }

    /// When set, a missing variable is an error instead of a placeholder.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn render(&self, root: &Root, args: &Arguments) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write(root.body(), args, None, &mut out)?;
        Ok(out)
    }

    /// `number` is the value `#` stands for inside the current plural branch.
    fn write(
        &self,
        message: &Message,
        args: &Arguments,
        number: Option<Number>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        match message {
            Message::Literal(text) => out.push_str(text),
            Message::Composite(parts) => {
                for part in parts {
                    self.write(part, args, number, out)?;
                }
            }
            Message::Variable(variable) => match args.get(variable.name()) {
                Some(value) => out.push_str(&value.to_string()),
                None if self.strict => {
                    return Err(RenderError::MissingArgument(variable.name().to_string()))
                }
                None => out.push_str(&variable.placeholder()),
            },
            Message::Plural(plural) => {
                let value = numeric_argument(plural.argument(), args)?;
                let (branch, shown) = self.choose_plural(plural, value);
                self.write(branch, args, Some(shown), out)?;
            }
            Message::Gender(gender) => {
                let label = label_argument(gender.argument(), args)?;
                self.write(gender.branch(&label), args, None, out)?;
            }
            Message::Select(select) => {
                let label = label_argument(select.argument(), args)?;
                if let Some(branch) = select.branch(&label) {
                    self.write(branch, args, None, out)?;
                }
            }
            Message::PluralValue => match number {
                Some(number) => out.push_str(&number.to_string()),
                None => return Err(RenderError::UnsupportedNode { node: "#" }),
            },
        }
        Ok(())
    }

    /// Exact `=N` cases win over categories; the category is computed after
    /// subtracting the offset.
    fn choose_plural<'t>(&self, plural: &'t Plural, value: Number) -> (&'t Message, Number) {
        let shown = value.minus(plural.offset());
        if let Some(branch) = value.as_integer().and_then(|exact| plural.exact(exact)) {
            return (branch, shown);
        }
        let operands = match shown {
            Number::Int(value) => Operands::from(value),
            Number::Float(value) => Operands::from(value),
        };
        let category = self.rule.categorize(operands);
        let branch = plural.form(category).unwrap_or_else(|| plural.other());
        (branch, shown)
    }
}

fn numeric_argument(name: &str, args: &Arguments) -> Result<Number, RenderError> {
    let value = args
        .get(name)
        .ok_or_else(|| RenderError::MissingArgument(name.to_string()))?;
    value.as_number().ok_or_else(|| RenderError::ArgumentType {
        name: name.to_string(),
        expected: ArgumentKind::Number,
    })
}

/// Select and gender compare the argument's display text against labels.
fn label_argument(name: &str, args: &Arguments) -> Result<String, RenderError> {
    args.get(name)
        .map(Value::to_string)
        .ok_or_else(|| RenderError::MissingArgument(name.to_string()))
}
