//! Parsed message trees.
//!
//! Every node owns its children and nothing mutates a tree once the parser
//! has built it, so a single [`Root`] can be rendered from many threads with
//! different locales and arguments.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use msgfmt_plural::PluralCategory;
use serde::Serialize;

use crate::render::{self, RenderError};
use crate::value::Arguments;

/// One node of a message tree.
/// 訊息樹中的一個節點。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    /// Verbatim text. Empty only for an empty message or branch.
    Literal(String),
    /// Two or more parts rendered in order.
    Composite(Vec<Message>),
    Variable(Variable),
    Plural(Plural),
    Gender(Gender),
    Select(Select),
    /// `#` inside a plural branch: the number that selected the branch.
    PluralValue,
}

impl Message {
    /// Collapses parts into the smallest equivalent node.
    /// 將片段合併為最小的等價節點。
    pub fn from_parts(mut parts: Vec<Message>) -> Self {
        match parts.len() {
            0 => Message::Literal(String::new()),
            1 => parts.remove(0),
            _ => Message::Composite(parts),
        }
    }

    /// Adds every argument name referenced by this node and its children.
    pub fn collect_arguments(&self, names: &mut BTreeSet<String>) {
        match self {
            Message::Literal(_) | Message::PluralValue => {}
            Message::Composite(parts) => {
                for part in parts {
                    part.collect_arguments(names);
                }
            }
            Message::Variable(variable) => {
                names.insert(variable.name.clone());
            }
            Message::Plural(plural) => {
                names.insert(plural.argument.clone());
                for branch in plural.branches() {
                    branch.collect_arguments(names);
                }
            }
            Message::Gender(gender) => {
                names.insert(gender.argument.clone());
                for branch in gender.branches() {
                    branch.collect_arguments(names);
                }
            }
            Message::Select(select) => {
                names.insert(select.argument.clone());
                for branch in select.cases.values() {
                    branch.collect_arguments(names);
                }
            }
        }
    }

    fn bind(&self, names: &[&str]) -> Message {
        let bind_box = |message: &Message| Box::new(message.bind(names));
        match self {
            Message::Literal(_) | Message::PluralValue => self.clone(),
            Message::Composite(parts) => {
                Message::Composite(parts.iter().map(|part| part.bind(names)).collect())
            }
            Message::Variable(variable) => Message::Variable(Variable {
                arg_index: names.iter().position(|name| *name == variable.name),
                ..variable.clone()
            }),
            Message::Plural(plural) => Message::Plural(Plural {
                argument: plural.argument.clone(),
                offset: plural.offset,
                ordinal: plural.ordinal,
                exact: plural
                    .exact
                    .iter()
                    .map(|(value, branch)| (*value, branch.bind(names)))
                    .collect(),
                forms: plural
                    .forms
                    .iter()
                    .map(|(category, branch)| (*category, branch.bind(names)))
                    .collect(),
                other: bind_box(&plural.other),
            }),
            Message::Gender(gender) => Message::Gender(Gender {
                argument: gender.argument.clone(),
                female: gender.female.as_deref().map(bind_box),
                male: gender.male.as_deref().map(bind_box),
                other: bind_box(&gender.other),
            }),
            Message::Select(select) => Message::Select(Select {
                argument: select.argument.clone(),
                cases: select
                    .cases
                    .iter()
                    .map(|(label, branch)| (label.clone(), branch.bind(names)))
                    .collect(),
            }),
        }
    }

    fn write_source(&self, out: &mut String, in_plural: bool) {
        match self {
            Message::Literal(text) => write_literal(text, out, in_plural),
            Message::Composite(parts) => {
                for part in parts {
                    part.write_source(out, in_plural);
                }
            }
            Message::Variable(variable) => out.push_str(&variable.placeholder()),
            Message::Plural(plural) => {
                out.push('{');
                out.push_str(&plural.argument);
                out.push_str(if plural.ordinal {
                    ", selectordinal,"
                } else {
                    ", plural,"
                });
                if plural.offset != 0 {
                    out.push_str(&format!(" offset:{}", plural.offset));
                }
                for (value, branch) in &plural.exact {
                    write_case(out, &format!("={value}"), branch, true);
                }
                for (category, branch) in &plural.forms {
                    write_case(out, category.as_str(), branch, true);
                }
                write_case(out, "other", &plural.other, true);
                out.push('}');
            }
            Message::Gender(gender) => {
                out.push('{');
                out.push_str(&gender.argument);
                out.push_str(", gender,");
                if let Some(female) = &gender.female {
                    write_case(out, "female", female, false);
                }
                if let Some(male) = &gender.male {
                    write_case(out, "male", male, false);
                }
                write_case(out, "other", &gender.other, false);
                out.push('}');
            }
            Message::Select(select) => {
                out.push('{');
                out.push_str(&select.argument);
                out.push_str(", select,");
                for (label, branch) in &select.cases {
                    write_case(out, label, branch, false);
                }
                out.push('}');
            }
            Message::PluralValue => out.push('#'),
        }
    }
}

fn write_case(out: &mut String, label: &str, branch: &Message, in_plural: bool) {
    out.push(' ');
    out.push_str(label);
    out.push_str(" {");
    branch.write_source(out, in_plural);
    out.push('}');
}

fn write_literal(text: &str, out: &mut String, in_plural: bool) {
    let is_special = |ch: char| ch == '{' || ch == '}' || (in_plural && ch == '#');
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            out.push_str("''");
        } else if is_special(ch) {
            out.push('\'');
            out.push(ch);
            while let Some(next) = chars.next_if(|next| is_special(*next)) {
                out.push(next);
            }
            out.push('\'');
        } else {
            out.push(ch);
        }
    }
}

/// `{name}` substitution.
/// `{name}` 變數替換。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arg_index: Option<usize>,
    /// Source text when it differs from `{name}`, e.g. `{ name }`.
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_index: None,
            token: None,
        }
    }

    /// Remembers how the placeholder was written in the template.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = (token != format!("{{{}}}", self.name)).then(|| token.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The placeholder exactly as written, `{name}` for built trees.
    /// 樣板中原始的佔位符文字。
    pub fn placeholder(&self) -> Cow<'_, str> {
        match &self.token {
            Some(token) => Cow::Borrowed(token),
            None => Cow::Owned(format!("{{{}}}", self.name)),
        }
    }

    /// Position of the name in the list passed to [`Root::bind`].
    pub fn arg_index(&self) -> Option<usize> {
        self.arg_index
    }
}

/// `{n, plural, ...}` and `{n, selectordinal, ...}`.
/// 複數與序數選擇節點。
///
/// Exact `=N` cases and category cases are kept apart; the renderer decides
/// which wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plural {
    argument: String,
    #[serde(skip_serializing_if = "is_zero")]
    offset: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ordinal: bool,
    exact: BTreeMap<i64, Message>,
    forms: BTreeMap<PluralCategory, Message>,
    other: Box<Message>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Plural {
    pub fn new(argument: impl Into<String>, other: Message) -> Self {
        Self {
            argument: argument.into(),
            offset: 0,
            ordinal: false,
            exact: BTreeMap::new(),
            forms: BTreeMap::new(),
            other: Box::new(other),
        }
    }

    /// Adds an `=value` case.
    pub fn with_exact(mut self, value: i64, message: Message) -> Self {
        self.exact.insert(value, message);
        self
    }

    /// Adds a category case; `Other` replaces the fallback branch.
    pub fn with_form(mut self, category: PluralCategory, message: Message) -> Self {
        if category == PluralCategory::Other {
            self.other = Box::new(message);
        } else {
            self.forms.insert(category, message);
        }
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_ordinal(mut self, ordinal: bool) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// True for `selectordinal`, which is rendered with the cardinal rules.
    pub fn is_ordinal(&self) -> bool {
        self.ordinal
    }

    pub fn exact(&self, value: i64) -> Option<&Message> {
        self.exact.get(&value)
    }

    /// Branch for `category`; `Other` always resolves.
    pub fn form(&self, category: PluralCategory) -> Option<&Message> {
        match category {
            PluralCategory::Other => Some(&self.other),
            _ => self.forms.get(&category),
        }
    }

    pub fn other(&self) -> &Message {
        &self.other
    }

    pub(crate) fn has_cases(&self) -> bool {
        !self.exact.is_empty() || !self.forms.is_empty()
    }

    fn branches(&self) -> impl Iterator<Item = &Message> {
        self.exact
            .values()
            .chain(self.forms.values())
            .chain(std::iter::once(self.other.as_ref()))
    }
}

/// `{who, gender, female {...} male {...} other {...}}`.
/// 依性別選擇分支的節點。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gender {
    argument: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    female: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    male: Option<Box<Message>>,
    other: Box<Message>,
}

impl Gender {
    pub fn new(argument: impl Into<String>, other: Message) -> Self {
        Self {
            argument: argument.into(),
            female: None,
            male: None,
            other: Box::new(other),
        }
    }

    pub fn with_female(mut self, message: Message) -> Self {
        self.female = Some(Box::new(message));
        self
    }

    pub fn with_male(mut self, message: Message) -> Self {
        self.male = Some(Box::new(message));
        self
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Case-sensitive branch lookup; anything but `female`/`male` gets `other`.
    pub fn branch(&self, value: &str) -> &Message {
        let chosen = match value {
            "female" => self.female.as_deref(),
            "male" => self.male.as_deref(),
            _ => None,
        };
        chosen.unwrap_or(&self.other)
    }

    fn branches(&self) -> impl Iterator<Item = &Message> {
        self.female
            .as_deref()
            .into_iter()
            .chain(self.male.as_deref())
            .chain(std::iter::once(self.other.as_ref()))
    }
}

/// `{status, select, online {...} other {...}}`.
/// 依標籤選擇分支的節點。
///
/// Cases are keyed by label, so their order in the source does not matter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Select {
    argument: String,
    cases: BTreeMap<String, Message>,
}

impl Select {
    pub fn new(argument: impl Into<String>, cases: BTreeMap<String, Message>) -> Self {
        Self {
            argument: argument.into(),
            cases,
        }
    }

    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Exact label match, then `other`.
    pub fn branch(&self, value: &str) -> Option<&Message> {
        self.cases.get(value).or_else(|| self.cases.get("other"))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }
}

/// A parsed template.
/// 解析完成的樣板。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Root {
    body: Message,
    declared_arguments: BTreeSet<String>,
}

impl Root {
    /// Wraps `body`, declaring every argument it references.
    pub fn new(body: Message) -> Self {
        let mut declared_arguments = BTreeSet::new();
        body.collect_arguments(&mut declared_arguments);
        Self {
            body,
            declared_arguments,
        }
    }

    pub fn body(&self) -> &Message {
        &self.body
    }

    pub fn declared_arguments(&self) -> &BTreeSet<String> {
        &self.declared_arguments
    }

    /// Returns a copy whose variables know their position in `names`.
    /// 回傳綁定參數位置的新樹，原樹不變。
    ///
    /// The receiver is left untouched; the copy declares exactly `names`.
    pub fn bind<S: AsRef<str>>(&self, names: &[S]) -> Root {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        Root {
            body: self.body.bind(&names),
            declared_arguments: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn render(&self, locale: &str, args: &Arguments) -> Result<String, RenderError> {
        render::render(self, locale, args)
    }

    /// Canonical template text that parses back to this tree.
    /// 可重新解析為同一棵樹的標準樣板文字。
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        self.body.write_source(&mut out, false);
        out
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Message {
        Message::Literal(text.to_string())
    }

    fn emails() -> Root {
        let plural = Plural::new(
            "n",
            Message::Composite(vec![
                Message::Variable(Variable::new("n")),
                literal(" emails."),
            ]),
        )
        .with_exact(0, literal("No emails."))
        .with_form(PluralCategory::One, literal("One email."));
        Root::new(Message::Plural(plural))
    }

    #[test]
    fn from_parts_collapses() {
        assert_eq!(Message::from_parts(Vec::new()), literal(""));
        assert_eq!(Message::from_parts(vec![literal("a")]), literal("a"));
        assert!(matches!(
            Message::from_parts(vec![literal("a"), Message::PluralValue]),
            Message::Composite(parts) if parts.len() == 2
        ));
    }

    #[test]
    fn declared_arguments_cover_nested_names() {
        let mut cases = BTreeMap::new();
        cases.insert("other".to_string(), Message::Variable(Variable::new("who")));
        let root = Root::new(Message::Composite(vec![
            Message::Select(Select::new("status", cases)),
            Message::Plural(Plural::new("n", literal("x")).with_exact(1, literal("y"))),
        ]));
        let names: Vec<_> = root.declared_arguments().iter().cloned().collect();
        assert_eq!(names, vec!["n", "status", "who"]);
    }

    #[test]
    fn bind_returns_new_tree() {
        let root = emails();
        let bound = root.bind(&["n"]);
        let Message::Plural(plural) = bound.body() else {
            panic!("expected plural");
        };
        let Message::Composite(parts) = plural.other() else {
            panic!("expected composite");
        };
        assert!(matches!(&parts[0], Message::Variable(v) if v.arg_index() == Some(0)));

        let Message::Plural(original) = root.body() else {
            panic!("expected plural");
        };
        let Message::Composite(parts) = original.other() else {
            panic!("expected composite");
        };
        assert!(matches!(&parts[0], Message::Variable(v) if v.arg_index().is_none()));
    }

    #[test]
    fn source_quotes_special_characters() {
        let root = Root::new(literal("it's {braced}"));
        assert_eq!(root.to_source(), "it''s '{'braced'}'");
    }

    #[test]
    fn source_of_plural() {
        assert_eq!(
            emails().to_source(),
            "{n, plural, =0 {No emails.} one {One email.} other {{n} emails.}}"
        );
    }

    #[test]
    fn gender_falls_back_to_other() {
        let gender = Gender::new("who", literal("they")).with_female(literal("she"));
        assert_eq!(gender.branch("female"), &literal("she"));
        assert_eq!(gender.branch("male"), &literal("they"));
        assert_eq!(gender.branch("Female"), &literal("they"));
    }

    #[test]
    fn root_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Root>();
    }
}
