use std::thread;

use msgfmt_message::{format, parse, Arguments, Root};

const PLAIN_SAMPLES: &[&str] = &[
    "",
    "Some text",
    "100% done!",
    "Файл сохранён",
    "檔案已儲存",
    "tab\tand\nnewline",
    "a # is only special inside plurals",
];

#[test]
fn text_without_braces_renders_unchanged() {
    for sample in PLAIN_SAMPLES {
        let rendered = format(sample, "en_US", &Arguments::new()).expect("format");
        assert_eq!(&rendered, sample, "sample {sample:?}");
    }
}

#[test]
fn single_substitution_is_prefix_value_suffix() {
    let values = ["", "x", "{braces}", "it's", "#1", "многоточие…"];
    for prefix in ["", "Hello ", "«"] {
        for suffix in ["", "!", " ok»"] {
            let template = format!("{prefix}{{v}}{suffix}");
            for value in values {
                let args = Arguments::new().with("v", value);
                assert_eq!(
                    format(&template, "en", &args).expect("format"),
                    format!("{prefix}{value}{suffix}")
                );
            }
        }
    }
}

#[test]
fn missing_argument_leaves_placeholder() {
    for name in ["name", "x1", "phone_number", "0"] {
        for token in [
            format!("{{{name}}}"),
            format!("{{ {name} }}"),
            format!("{{{name}  }}"),
            format!("{{\t{name}}}"),
        ] {
            let template = format!("before {token} after");
            assert_eq!(
                format(&template, "en", &Arguments::new()).expect("format"),
                template
            );
        }
    }
    assert_eq!(
        format("Hi { name }! }", "en", &Arguments::new()).expect("format"),
        "Hi { name }! }"
    );
}

#[test]
fn select_case_order_does_not_matter() {
    let forward = parse("{s, select, a {A} b {B} c {C} other {?}}").expect("parse");
    let backward = parse("{s, select, other {?} c {C} b {B} a {A}}").expect("parse");
    for label in ["a", "b", "c", "d", ""] {
        let args = Arguments::new().with("s", label);
        assert_eq!(
            forward.render("en", &args).expect("render"),
            backward.render("en", &args).expect("render")
        );
    }
}

#[test]
fn gender_case_order_does_not_matter() {
    let forward = parse("{g, gender, female {She} male {He} other {They}}").expect("parse");
    let backward = parse("{g, gender, other {They} male {He} female {She}}").expect("parse");
    for value in ["female", "male", "x"] {
        let args = Arguments::new().with("g", value);
        assert_eq!(
            forward.render("en", &args).expect("render"),
            backward.render("en", &args).expect("render")
        );
    }
}

#[test]
fn plural_case_order_does_not_matter() {
    let forward = parse("{n, plural, =0 {none} one {one} few {few} other {other}}").expect("parse");
    let backward =
        parse("{n, plural, other {other} few {few} one {one} =0 {none}}").expect("parse");
    for n in 0..=30 {
        let args = Arguments::new().with("n", n);
        assert_eq!(
            forward.render("ru", &args).expect("render"),
            backward.render("ru", &args).expect("render")
        );
    }
}

#[test]
fn source_round_trips_through_parser() {
    let templates = [
        "Some text",
        "Your phone is {phone}",
        "It''s '{'quoted'}'",
        "Hi { name }, '#1 fan'",
        "{n, plural, =0 {No emails.} =1 {One email.} other {{n} emails.}}",
        "{g, plural, offset:1 =0 {nobody} one {# other} other {# others}}",
        "{place, selectordinal, one {#st} two {#nd} few {#rd} other {#th}}",
        "{who, gender, female {She} male {He} other {They}} liked '#'{n, plural, one {'#' #} other {#}}",
        "{s, select, a {{n, plural, one {one} other {# many}}} other {plain}}",
    ];
    for template in templates {
        let root = parse(template).expect("parse");
        let reparsed = parse(&root.to_source()).expect("reparse");
        assert_eq!(root, reparsed, "template {template:?}");
    }
}

#[test]
fn bind_assigns_positions_without_touching_original() {
    let root = parse("{user} sent {count, plural, one {# file} other {# files}}").expect("parse");
    let bound = root.bind(&["count", "user"]);

    assert_eq!(
        root.declared_arguments().iter().collect::<Vec<_>>(),
        ["count", "user"]
    );
    assert_eq!(bound.declared_arguments().len(), 2);

    let args = Arguments::new().with("user", "Ada").with("count", 2);
    assert_eq!(
        bound.render("en", &args).expect("render"),
        root.render("en", &args).expect("render")
    );
}

#[test]
fn parsed_templates_render_concurrently() {
    let root: Root = parse("{n, plural, one {# день} few {# дня} many {# дней} other {# дня}}")
        .expect("parse");
    let expected: Vec<String> = (0..200)
        .map(|n| {
            root.render("ru", &Arguments::new().with("n", n))
                .expect("render")
        })
        .collect();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for (n, want) in expected.iter().enumerate() {
                    let args = Arguments::new().with("n", n);
                    assert_eq!(&root.render("ru", &args).expect("render"), want);
                }
            });
        }
    });
}
