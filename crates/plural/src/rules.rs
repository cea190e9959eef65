//! Per-locale cardinal rules.
//!
//! # Invariants
//!
//! 1. Every rule maps every [`Operands`] value to exactly one category.
//! 2. `Other` is the catch-all; a rule only names a more specific category
//!    when its CLDR condition holds.
//! 3. [`LOCALE_RULES`] is the only place that decides which language uses
//!    which rule. Adding a locale is a table entry.

use icu_locid::LanguageIdentifier;

use crate::category::PluralCategory;
use crate::operands::Operands;

/// Rule families following the CLDR cardinal plural definitions.
/// 依 CLDR 基數複數定義分組的規則。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// `one` for exactly 1, `other` for everything else.
    English,
    /// English-like, plus `many` for non-zero multiples of one million.
    Romance,
    /// `one` for 0 and 1 (including fractions below 2), `many` for millions.
    French,
    /// Russian/Ukrainian: `one`/`few`/`many` from the last one or two digits.
    Slavic,
    Polish,
    /// Czech/Slovak: `few` for 2-4, `many` for fractions.
    Czech,
    Arabic,
    /// Languages without plural inflection; always `other`.
    NoPlural,
}

/// Language (or `language-REGION` where the region has its own rule) to
/// rule, sorted by key for binary search.
pub static LOCALE_RULES: &[(&str, PluralRule)] = &[
    ("ar", PluralRule::Arabic),
    ("be", PluralRule::Slavic),
    ("bg", PluralRule::English),
    ("ca", PluralRule::Romance),
    ("cs", PluralRule::Czech),
    ("de", PluralRule::English),
    ("el", PluralRule::English),
    ("en", PluralRule::English),
    ("es", PluralRule::Romance),
    ("et", PluralRule::English),
    ("fi", PluralRule::English),
    ("fr", PluralRule::French),
    ("hu", PluralRule::English),
    ("id", PluralRule::NoPlural),
    ("it", PluralRule::Romance),
    ("ja", PluralRule::NoPlural),
    ("ko", PluralRule::NoPlural),
    ("ms", PluralRule::NoPlural),
    ("nb", PluralRule::English),
    ("nl", PluralRule::English),
    ("nn", PluralRule::English),
    ("no", PluralRule::English),
    ("pl", PluralRule::Polish),
    ("pt", PluralRule::French),
    ("pt-PT", PluralRule::Romance),
    ("ru", PluralRule::Slavic),
    ("sk", PluralRule::Czech),
    ("sv", PluralRule::English),
    ("th", PluralRule::NoPlural),
    ("tr", PluralRule::English),
    ("uk", PluralRule::Slavic),
    ("vi", PluralRule::NoPlural),
    ("zh", PluralRule::NoPlural),
];

impl PluralRule {
    /// Picks the rule for a locale tag such as `ru_RU`, `pt-BR` or `en`.
    /// 依語系標籤挑選規則。
    ///
    /// Script and variants are ignored, and so is the region unless the
    /// table lists it. Unknown languages get [`PluralRule::English`].
    pub fn for_locale(locale: &str) -> Self {
        let (language, region) = split_locale(locale);
        region
            .and_then(|region| lookup(&format!("{language}-{region}")))
            .or_else(|| lookup(&language))
            .unwrap_or(PluralRule::English)
    }

    pub fn categorize(self, operands: Operands) -> PluralCategory {
        match self {
            PluralRule::English => english(operands),
            PluralRule::Romance => romance(operands),
            PluralRule::French => french(operands),
            PluralRule::Slavic => slavic(operands),
            PluralRule::Polish => polish(operands),
            PluralRule::Czech => czech(operands),
            PluralRule::Arabic => arabic(operands),
            PluralRule::NoPlural => PluralCategory::Other,
        }
    }
}

/// Lowercase base language subtag of `locale`.
/// 取得語系標籤的小寫基本語言代碼。
///
/// Accepts BCP 47 (`pt-BR`) and POSIX-style (`ru_RU.UTF-8`) tags. Tags the
/// identifier parser rejects fall back to their leading letters.
pub fn base_language(locale: &str) -> String {
    split_locale(locale).0
}

fn lookup(key: &str) -> Option<PluralRule> {
    LOCALE_RULES
        .binary_search_by_key(&key, |(code, _)| *code)
        .ok()
        .map(|index| LOCALE_RULES[index].1)
}

/// Lowercase language and uppercase region, if any.
fn split_locale(locale: &str) -> (String, Option<String>) {
    let tag = locale.split(['.', '@']).next().unwrap_or(locale).trim();
    if let Ok(identifier) = LanguageIdentifier::try_from_bytes(tag.as_bytes()) {
        let region = identifier
            .region
            .map(|region| region.as_str().to_string());
        return (identifier.language.as_str().to_string(), region);
    }
    let mut subtags = tag.split(['-', '_']);
    let language = subtags
        .next()
        .unwrap_or_default()
        .chars()
        .take_while(|ch| ch.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    let region = subtags
        .find(|subtag| subtag.len() == 2 && subtag.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map(|subtag| subtag.to_ascii_uppercase());
    (language, region)
}

fn is_million_multiple(i: u64) -> bool {
    i != 0 && i % 1_000_000 == 0
}

fn english(operands: Operands) -> PluralCategory {
    match operands.integer() {
        Some(1) => PluralCategory::One,
        _ => PluralCategory::Other,
    }
}

fn romance(operands: Operands) -> PluralCategory {
    match operands.integer() {
        Some(1) => PluralCategory::One,
        Some(i) if is_million_multiple(i) => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}

fn french(operands: Operands) -> PluralCategory {
    if operands.i() <= 1 {
        return PluralCategory::One;
    }
    match operands.integer() {
        Some(i) if is_million_multiple(i) => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}

fn slavic(operands: Operands) -> PluralCategory {
    let Some(i) = operands.integer() else {
        return PluralCategory::Other;
    };
    let mod10 = i % 10;
    let mod100 = i % 100;
    if mod10 == 1 && mod100 != 11 {
        PluralCategory::One
    } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
        PluralCategory::Few
    } else if mod10 == 0 || (5..=9).contains(&mod10) || (11..=14).contains(&mod100) {
        PluralCategory::Many
    } else {
        PluralCategory::Other
    }
}

fn polish(operands: Operands) -> PluralCategory {
    let Some(i) = operands.integer() else {
        return PluralCategory::Other;
    };
    let mod10 = i % 10;
    let mod100 = i % 100;
    if i == 1 {
        PluralCategory::One
    } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
        PluralCategory::Few
    } else if mod10 <= 1 || (5..=9).contains(&mod10) || (12..=14).contains(&mod100) {
        PluralCategory::Many
    } else {
        PluralCategory::Other
    }
}

fn czech(operands: Operands) -> PluralCategory {
    match operands.integer() {
        Some(1) => PluralCategory::One,
        Some(2..=4) => PluralCategory::Few,
        Some(_) => PluralCategory::Other,
        None => PluralCategory::Many,
    }
}

fn arabic(operands: Operands) -> PluralCategory {
    let Some(i) = operands.integer() else {
        return PluralCategory::Other;
    };
    match (i, i % 100) {
        (0, _) => PluralCategory::Zero,
        (1, _) => PluralCategory::One,
        (2, _) => PluralCategory::Two,
        (_, 3..=10) => PluralCategory::Few,
        (_, 11..=99) => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}
