//! Cardinal plural category resolution for message rendering.
//! 訊息渲染使用的基數複數類別判定。

pub mod category;
pub mod operands;
pub mod rules;

pub use category::PluralCategory;
pub use operands::Operands;
pub use rules::{base_language, PluralRule};

/// Resolves the cardinal plural category of `number` for `locale`.
/// 依語系判定數值的基數複數類別。
///
/// Never fails: unknown locales use the English-like rule and numbers no
/// rule claims land in [`PluralCategory::Other`].
pub fn category<N: Into<Operands>>(locale: &str, number: N) -> PluralCategory {
    PluralRule::for_locale(locale).categorize(number.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_region_is_ignored() {
        assert_eq!(category("en_US", 1), PluralCategory::One);
        assert_eq!(category("en-GB", 1), PluralCategory::One);
        assert_eq!(category("en_US", 0), PluralCategory::Other);
        assert_eq!(category("en_US", 10), PluralCategory::Other);
    }

    #[test]
    fn russian_days() {
        assert_eq!(category("ru_RU", 1), PluralCategory::One);
        assert_eq!(category("ru_RU", 2), PluralCategory::Few);
        assert_eq!(category("ru_RU", 5), PluralCategory::Many);
        assert_eq!(category("ru_RU", 11), PluralCategory::Many);
        assert_eq!(category("ru_RU", 21), PluralCategory::One);
        assert_eq!(category("ru_RU", 22), PluralCategory::Few);
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(category("tlh", 1), PluralCategory::One);
        assert_eq!(category("", 3), PluralCategory::Other);
    }

    #[test]
    fn negative_numbers_use_absolute_value() {
        assert_eq!(category("en", -1), PluralCategory::One);
        assert_eq!(category("ru", -3), PluralCategory::Few);
    }
}
