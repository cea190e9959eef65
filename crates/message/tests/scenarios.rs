use msgfmt_message::{format, parse, Arguments, MessageError, RenderError, SyntaxError};

#[test]
fn plain_text_renders_verbatim() {
    let root = parse("Some text").expect("parse");
    assert_eq!(
        root.render("en_US", &Arguments::new()).expect("render"),
        "Some text"
    );
}

#[test]
fn apostrophes_quote_until_the_next_lone_apostrophe() {
    let args = Arguments::new().with("y", 1);
    assert_eq!(format("'x{y}'", "en", &args).expect("format"), "x{y}");
    assert_eq!(
        format("It''s {y} o''clock", "en", &args).expect("format"),
        "It's 1 o'clock"
    );
    assert_eq!(
        format("'{y}' is {y}", "en", &args).expect("format"),
        "{y} is 1"
    );
}

#[test]
fn phone_number_substitution() {
    let args = Arguments::new().with("phone", "+79131234567");
    assert_eq!(
        format("Your phone is {phone}", "en_US", &args).expect("format"),
        "Your phone is +79131234567"
    );
}

#[test]
fn english_emails_use_exact_cases() {
    let root = parse("{n, plural, =0 {No emails.} =1 {One email.} other {{n} emails.}}")
        .expect("parse");
    let render = |n: i64| {
        root.render("en_US", &Arguments::new().with("n", n))
            .expect("render")
    };
    assert_eq!(render(0), "No emails.");
    assert_eq!(render(1), "One email.");
    assert_eq!(render(10), "10 emails.");
}

#[test]
fn russian_days_follow_slavic_rules() {
    let root = parse("{days, plural, =1 {{days} День} few {{days} Дня} other {{days} Дней}}")
        .expect("parse");
    let render = |days: i64| {
        root.render("ru_RU", &Arguments::new().with("days", days))
            .expect("render")
    };
    assert_eq!(render(1), "1 День");
    assert_eq!(render(2), "2 Дня");
    assert_eq!(render(4), "4 Дня");
    assert_eq!(render(5), "5 Дней");
    assert_eq!(render(11), "11 Дней");
    assert_eq!(render(12), "12 Дней");
    assert_eq!(render(22), "22 Дня");
    // 21 is `one` in Russian; without a `one` case it falls back to `other`
    assert_eq!(render(21), "21 Дней");
}

#[test]
fn russian_days_with_one_case() {
    let root = parse(
        "{days, plural, one {{days} день} few {{days} дня} many {{days} дней} other {{days} дня}}",
    )
    .expect("parse");
    let render = |days: i64| {
        root.render("ru_RU", &Arguments::new().with("days", days))
            .expect("render")
    };
    assert_eq!(render(21), "21 день");
    assert_eq!(render(23), "23 дня");
    assert_eq!(render(111), "111 дней");
    assert_eq!(render(0), "0 дней");
}

#[test]
fn select_status_falls_back_to_other() {
    let root = parse("{status, select, online {Online now} offline {Offline} other {Status unknown}}")
        .expect("parse");
    let render = |status: &str| {
        root.render("en_US", &Arguments::new().with("status", status))
            .expect("render")
    };
    assert_eq!(render("online"), "Online now");
    assert_eq!(render("offline"), "Offline");
    assert_eq!(render("unknown"), "Status unknown");
}

#[test]
fn gender_construct() {
    let root = parse("{who, gender, female {She} male {He} other {They}} replied.").expect("parse");
    let render = |who: &str| {
        root.render("en", &Arguments::new().with("who", who))
            .expect("render")
    };
    assert_eq!(render("female"), "She replied.");
    assert_eq!(render("male"), "He replied.");
    assert_eq!(render("robot"), "They replied.");
}

#[test]
fn positional_arguments() {
    let args = Arguments::positional(["7", "12"]);
    assert_eq!(
        format("Ln {0}, Col {1}", "en", &args).expect("format"),
        "Ln 7, Col 12"
    );
}

#[test]
fn arabic_uses_zero_and_two() {
    let root = parse("{n, plural, zero {لا شيء} one {واحد} two {اثنان} few {# قليل} many {# كثير} other {#}}")
        .expect("parse");
    let render = |n: i64| {
        root.render("ar", &Arguments::new().with("n", n))
            .expect("render")
    };
    assert_eq!(render(0), "لا شيء");
    assert_eq!(render(2), "اثنان");
    assert_eq!(render(5), "5 قليل");
    assert_eq!(render(50), "50 كثير");
    assert_eq!(render(100), "100");
}

#[test]
fn format_reports_both_error_kinds() {
    assert!(matches!(
        format("{n, plural, one {x}}", "en", &Arguments::new()),
        Err(MessageError::Syntax(SyntaxError::MissingOther { .. }))
    ));
    assert_eq!(
        format("{n, plural, one {x} other {y}}", "en", &Arguments::new()),
        Err(MessageError::Render(RenderError::MissingArgument(
            "n".into()
        )))
    );
}
