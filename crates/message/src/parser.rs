//! Recursive-descent parser for ICU-style message templates.
//! ICU 風格訊息樣板的遞迴下降解析器。
//!
//! Offsets in errors are byte offsets into the template.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use msgfmt_plural::PluralCategory;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::tree::{Gender, Message, Plural, Root, Select, Variable};

/// `{name,` anywhere in the input: the template uses constructs, so errors
/// are real errors rather than informal braces.
static CONSTRUCT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\s*[\p{L}\p{N}_]+\s*,").expect("construct header pattern"));
static PLAIN_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\s*([\p{L}\p{N}_]+)\s*\}").expect("plain variable pattern"));
/// `{name` running into the end of the input.
static UNCLOSED_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\s*[\p{L}\p{N}_]+\s*$").expect("unclosed variable pattern"));

/// Deepest element nesting the parser accepts.
pub const MAX_DEPTH: usize = 128;

/// Errors raised while parsing a template.
/// 解析樣板時可能回傳的錯誤。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("element opened at offset {offset} is never closed")]
    UnterminatedElement { offset: usize },
    #[error("unmatched '}}' at offset {offset}")]
    UnmatchedClose { offset: usize },
    #[error("unknown keyword '{keyword}' at offset {offset}; expected plural, selectordinal, select or gender")]
    UnknownKeyword { offset: usize, keyword: String },
    #[error("duplicate case '{label}' at offset {offset}")]
    DuplicateLabel { offset: usize, label: String },
    #[error("{keyword} element at offset {offset} has no 'other' case")]
    MissingOther {
        offset: usize,
        keyword: &'static str,
    },
    #[error("plural element at offset {offset} needs at least one case besides 'other'")]
    MissingCases { offset: usize },
    #[error("invalid {keyword} case '{label}' at offset {offset}")]
    InvalidLabel {
        offset: usize,
        keyword: &'static str,
        label: String,
    },
    #[error("invalid plural offset at offset {offset}")]
    InvalidOffset { offset: usize },
    #[error("element at offset {offset} is nested deeper than {limit} levels")]
    NestingTooDeep { offset: usize, limit: usize },
    #[error("expected {expected} at offset {offset}, found {}", describe(.found))]
    Unexpected {
        offset: usize,
        expected: &'static str,
        found: Option<char>,
    },
}

fn describe(found: &Option<char>) -> String {
    match found {
        Some(ch) => format!("'{ch}'"),
        None => "end of input".to_string(),
    }
}

impl SyntaxError {
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnterminatedElement { offset }
            | SyntaxError::UnmatchedClose { offset }
            | SyntaxError::UnknownKeyword { offset, .. }
            | SyntaxError::DuplicateLabel { offset, .. }
            | SyntaxError::MissingOther { offset, .. }
            | SyntaxError::MissingCases { offset }
            | SyntaxError::InvalidLabel { offset, .. }
            | SyntaxError::InvalidOffset { offset }
            | SyntaxError::NestingTooDeep { offset, .. }
            | SyntaxError::Unexpected { offset, .. } => *offset,
        }
    }
}

/// Parses `template` into a message tree.
/// 將樣板解析為訊息樹。
///
/// Templates that fail the full grammar but contain no `{name, keyword, ...}`
/// construct are re-read with plain `{name}` substitution only, so informal
/// braces in prose still render. A trailing `{name` that is never closed
/// stays an error.
pub fn parse(template: &str) -> Result<Root, SyntaxError> {
    match Parser::new(template).parse_root() {
        Ok(body) => Ok(Root::new(body)),
        Err(error @ SyntaxError::UnterminatedElement { .. })
            if UNCLOSED_VARIABLE.is_match(template) =>
        {
            Err(error)
        }
        Err(_) if !CONSTRUCT_HEADER.is_match(template) => Ok(Root::new(parse_plain(template))),
        Err(error) => Err(error),
    }
}

/// Reduced grammar: `{name}` is a substitution, everything else is literal.
fn parse_plain(template: &str) -> Message {
    let mut parts = Vec::new();
    let mut last = 0;
    for captures in PLAIN_VARIABLE.captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(Message::Literal(template[last..whole.start()].to_string()));
        }
        parts.push(Message::Variable(
            Variable::new(name.as_str()).with_token(whole.as_str()),
        ));
        last = whole.end();
    }
    if last < template.len() {
        parts.push(Message::Literal(template[last..].to_string()));
    }
    Message::from_parts(parts)
}

enum Keyword {
    Plural { ordinal: bool },
    Select,
    Gender,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn parse_root(&mut self) -> Result<Message, SyntaxError> {
        self.parse_message(false, None)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        SyntaxError::Unexpected {
            offset: self.pos,
            expected,
            found: self.peek(),
        }
    }

    /// Reads a (sub-)message. `open` is the offset of the `{` whose branch is
    /// being read; `None` at top level. Stops before the closing `}`.
    fn parse_message(
        &mut self,
        plural_value: bool,
        open: Option<usize>,
    ) -> Result<Message, SyntaxError> {
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    if let Some(offset) = open {
                        return Err(SyntaxError::UnterminatedElement { offset });
                    }
                    break;
                }
                Some('}') => {
                    if open.is_some() {
                        break;
                    }
                    return Err(SyntaxError::UnmatchedClose { offset: self.pos });
                }
                Some('{') => {
                    flush_text(&mut text, &mut parts);
                    if self.depth == MAX_DEPTH {
                        return Err(SyntaxError::NestingTooDeep {
                            offset: self.pos,
                            limit: MAX_DEPTH,
                        });
                    }
                    self.depth += 1;
                    let element = self.parse_element();
                    self.depth -= 1;
                    parts.push(element?);
                }
                Some('#') if plural_value => {
                    flush_text(&mut text, &mut parts);
                    self.bump();
                    parts.push(Message::PluralValue);
                }
                Some('\'') => self.parse_apostrophe(&mut text),
                Some(ch) => {
                    text.push(ch);
                    self.bump();
                }
            }
        }
        flush_text(&mut text, &mut parts);
        Ok(Message::from_parts(parts))
    }

    /// `''` is a quote. Any other `'` opens a quoted span that runs to the
    /// next lone `'` or the end of input; `''` inside it is a quote too.
    fn parse_apostrophe(&mut self, text: &mut String) {
        self.bump();
        if self.peek() == Some('\'') {
            self.bump();
            text.push('\'');
            return;
        }
        while let Some(ch) = self.bump() {
            if ch != '\'' {
                text.push(ch);
            } else if self.peek() == Some('\'') {
                self.bump();
                text.push('\'');
            } else {
                break;
            }
        }
    }

    fn parse_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
        {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn parse_element(&mut self) -> Result<Message, SyntaxError> {
        let open = self.pos;
        self.bump();
        self.skip_whitespace();
        let name = self.parse_identifier();
        if name.is_empty() {
            return Err(self.unexpected_or_unterminated(open, "argument name"));
        }
        self.skip_whitespace();
        match self.peek() {
            Some('}') => {
                self.bump();
                let token = &self.input[open..self.pos];
                return Ok(Message::Variable(Variable::new(name).with_token(token)));
            }
            Some(',') => {
                self.bump();
            }
            _ => return Err(self.unexpected_or_unterminated(open, "'}' or ','")),
        }

        self.skip_whitespace();
        let keyword_start = self.pos;
        let keyword = match self.parse_identifier() {
            "plural" => Keyword::Plural { ordinal: false },
            "selectordinal" => Keyword::Plural { ordinal: true },
            "select" => Keyword::Select,
            "gender" => Keyword::Gender,
            "" => return Err(self.unexpected_or_unterminated(open, "construct keyword")),
            other => {
                return Err(SyntaxError::UnknownKeyword {
                    offset: keyword_start,
                    keyword: other.to_string(),
                })
            }
        };
        self.skip_whitespace();
        if self.peek() != Some(',') {
            return Err(self.unexpected_or_unterminated(open, "','"));
        }
        self.bump();

        match keyword {
            Keyword::Plural { ordinal } => self.parse_plural(name, open, ordinal),
            Keyword::Select => self.parse_select(name, open),
            Keyword::Gender => self.parse_gender(name, open),
        }
    }

    fn unexpected_or_unterminated(&self, open: usize, expected: &'static str) -> SyntaxError {
        if self.peek().is_none() {
            SyntaxError::UnterminatedElement { offset: open }
        } else {
            self.unexpected(expected)
        }
    }

    /// Calls `on_case` with each `label {message}` pair up to and including
    /// the element's closing `}`.
    fn parse_cases<F>(
        &mut self,
        open: usize,
        plural_value: bool,
        mut on_case: F,
    ) -> Result<(), SyntaxError>
    where
        F: FnMut(usize, &'a str, Message) -> Result<(), SyntaxError>,
    {
        let input = self.input;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(SyntaxError::UnterminatedElement { offset: open }),
                Some('}') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
            }
            let label_start = self.pos;
            let label = &input[label_start..self.scan_label()];
            if label.is_empty() {
                return Err(self.unexpected("case label"));
            }
            self.skip_whitespace();
            if self.peek() != Some('{') {
                return Err(self.unexpected_or_unterminated(open, "'{' to open a case"));
            }
            let branch_open = self.pos;
            self.bump();
            let message = self.parse_message(plural_value, Some(branch_open))?;
            self.bump();
            on_case(label_start, label, message)?;
        }
    }

    /// Skips a case label (`=N` or an identifier) and returns its end.
    fn scan_label(&mut self) -> usize {
        if self.peek() == Some('=') {
            self.bump();
            if self.peek() == Some('-') {
                self.bump();
            }
            while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                self.bump();
            }
        } else {
            self.parse_identifier();
        }
        self.pos
    }

    fn parse_offset(&mut self) -> Result<u32, SyntaxError> {
        const OFFSET: &str = "offset:";
        if !self.input[self.pos..].starts_with(OFFSET) {
            return Ok(0);
        }
        let start = self.pos;
        self.pos += OFFSET.len();
        self.skip_whitespace();
        let digits_start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.bump();
        }
        self.input[digits_start..self.pos]
            .parse::<u32>()
            .map_err(|_| SyntaxError::InvalidOffset { offset: start })
    }

    fn parse_plural(
        &mut self,
        argument: &str,
        open: usize,
        ordinal: bool,
    ) -> Result<Message, SyntaxError> {
        self.skip_whitespace();
        let offset = self.parse_offset()?;
        let mut exact: BTreeMap<i64, Message> = BTreeMap::new();
        let mut forms: BTreeMap<PluralCategory, Message> = BTreeMap::new();
        self.parse_cases(open, true, |start, label, message| {
            if let Some(number) = label.strip_prefix('=') {
                let value = number.parse::<i64>().map_err(|_| SyntaxError::InvalidLabel {
                    offset: start,
                    keyword: "plural",
                    label: label.to_string(),
                })?;
                return insert_case(&mut exact, value, message, start, label);
            }
            let category = PluralCategory::parse(label).ok_or_else(|| SyntaxError::InvalidLabel {
                offset: start,
                keyword: "plural",
                label: label.to_string(),
            })?;
            insert_case(&mut forms, category, message, start, label)
        })?;

        let Some(other) = forms.remove(&PluralCategory::Other) else {
            return Err(SyntaxError::MissingOther {
                offset: open,
                keyword: if ordinal { "selectordinal" } else { "plural" },
            });
        };
        let mut plural = Plural::new(argument, other)
            .with_offset(offset)
            .with_ordinal(ordinal);
        for (value, message) in exact {
            plural = plural.with_exact(value, message);
        }
        for (category, message) in forms {
            plural = plural.with_form(category, message);
        }
        if !plural.has_cases() {
            return Err(SyntaxError::MissingCases { offset: open });
        }
        Ok(Message::Plural(plural))
    }

    fn parse_select(&mut self, argument: &str, open: usize) -> Result<Message, SyntaxError> {
        let mut cases: BTreeMap<String, Message> = BTreeMap::new();
        self.parse_cases(open, false, |start, label, message| {
            if label.starts_with('=') {
                return Err(SyntaxError::InvalidLabel {
                    offset: start,
                    keyword: "select",
                    label: label.to_string(),
                });
            }
            insert_case(&mut cases, label.to_string(), message, start, label)
        })?;
        if !cases.contains_key("other") {
            return Err(SyntaxError::MissingOther {
                offset: open,
                keyword: "select",
            });
        }
        Ok(Message::Select(Select::new(argument, cases)))
    }

    fn parse_gender(&mut self, argument: &str, open: usize) -> Result<Message, SyntaxError> {
        let mut female = None;
        let mut male = None;
        let mut other = None;
        self.parse_cases(open, false, |start, label, message| {
            let slot = match label {
                "female" => &mut female,
                "male" => &mut male,
                "other" => &mut other,
                _ => {
                    return Err(SyntaxError::InvalidLabel {
                        offset: start,
                        keyword: "gender",
                        label: label.to_string(),
                    })
                }
            };
            if slot.is_some() {
                return Err(SyntaxError::DuplicateLabel {
                    offset: start,
                    label: label.to_string(),
                });
            }
            *slot = Some(message);
            Ok(())
        })?;
        let Some(other) = other else {
            return Err(SyntaxError::MissingOther {
                offset: open,
                keyword: "gender",
            });
        };
        let mut gender = Gender::new(argument, other);
        if let Some(female) = female {
            gender = gender.with_female(female);
        }
        if let Some(male) = male {
            gender = gender.with_male(male);
        }
        Ok(Message::Gender(gender))
    }
}

fn flush_text(text: &mut String, parts: &mut Vec<Message>) {
    if !text.is_empty() {
        parts.push(Message::Literal(std::mem::take(text)));
    }
}

fn insert_case<K: Ord>(
    cases: &mut BTreeMap<K, Message>,
    key: K,
    message: Message,
    offset: usize,
    label: &str,
) -> Result<(), SyntaxError> {
    match cases.entry(key) {
        Entry::Occupied(_) => Err(SyntaxError::DuplicateLabel {
            offset,
            label: label.to_string(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(message);
            Ok(())
        }
    }
}
