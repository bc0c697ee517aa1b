use casecon::action::Action;
use casecon::transform::{transform, transform_named, SelectionStats};

#[test]
fn converts_documented_examples() {
    assert_eq!(transform("hello world", Action::SnakeCase), "hello_world");
    assert_eq!(transform("Hello World", Action::KebabCase), "hello-world");
    assert_eq!(transform("hello world", Action::PascalCase), "HelloWorld");
    assert_eq!(transform("a b", Action::MacroCase), "A_B");
    assert_eq!(transform_named("a b", "uppersnakecase"), "A_B");
}

#[test]
fn simple_cases() {
    assert_eq!(transform("Rust Test", Action::Uppercase), "RUST TEST");
    assert_eq!(transform("Rust Test", Action::Lowercase), "rust test");
    assert_eq!(transform("they're here", Action::TitleCase), "They'Re Here");
    assert_eq!(transform("hELLO World", Action::SentenceCase), "Hello world");
    assert_eq!(transform("", Action::SentenceCase), "");
}

#[test]
fn whitespace_runs_collapse_to_one_separator() {
    assert_eq!(transform("one  two\tthree", Action::SnakeCase), "one_two_three");
    assert_eq!(transform("one \n two", Action::KebabCase), "one-two");
    assert_eq!(transform("  spaced  out ", Action::PascalCase), "SpacedOut");
}

#[test]
fn idempotent_modes_stay_fixed() {
    let samples = ["hello world", "Mixed CASE input", "  padded\ttext ", "x"];
    let modes = [
        Action::Uppercase,
        Action::Lowercase,
        Action::MacroCase,
        Action::SnakeCase,
        Action::KebabCase,
        Action::PascalCase,
    ];
    for mode in modes {
        for sample in samples {
            let once = transform(sample, mode);
            assert_eq!(transform(&once, mode), once, "{mode} on {sample:?}");
        }
    }
}

#[test]
fn pascal_case_keeps_inner_capitals() {
    let once = transform("hello world", Action::PascalCase);
    assert_eq!(once, "HelloWorld");
    assert_eq!(transform(&once, Action::PascalCase), "HelloWorld");
    assert_eq!(transform("parse HTTPHeader", Action::PascalCase), "ParseHTTPHeader");
}

#[test]
fn auxiliary_actions_and_unknown_names_pass_text_through() {
    assert_eq!(transform("keep Me", Action::CountSelection), "keep Me");
    assert_eq!(transform("keep Me", Action::ShowWindow), "keep Me");
    assert_eq!(transform_named("keep Me", "zigzagcase"), "keep Me");
}

#[test]
fn counts_selection() {
    let stats = SelectionStats::of("one two\nthree");
    assert_eq!(stats.chars, 13);
    assert_eq!(stats.words, 3);
    assert_eq!(stats.lines, 2);
    assert_eq!(SelectionStats::of(""), SelectionStats::default());
}
