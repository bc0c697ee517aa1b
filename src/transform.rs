//! Pure text conversions behind every case action.

use crate::action::Action;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Apply the conversion bound to `action`.
///
/// Auxiliary actions have no conversion and return the text unchanged.
pub fn transform(text: &str, action: Action) -> String {
    match action {
        Action::Uppercase => text.to_uppercase(),
        Action::Lowercase => text.to_lowercase(),
        Action::TitleCase => title_case(text),
        Action::SentenceCase => sentence_case(text),
        Action::MacroCase => WHITESPACE.replace_all(text, "_").to_uppercase(),
        Action::SnakeCase => WHITESPACE.replace_all(text, "_").to_lowercase(),
        Action::KebabCase => WHITESPACE.replace_all(text, "-").to_lowercase(),
        Action::PascalCase => pascal_case(text),
        Action::CountSelection | Action::ShowWindow => text.to_string(),
    }
}

/// Like [`transform`] but resolves the action by name. Unknown names leave
/// the text untouched.
pub fn transform_named(text: &str, name: &str) -> String {
    match name.parse::<Action>() {
        Ok(action) => transform(text, action),
        Err(err) => {
            tracing::warn!(%err, "passing text through unchanged");
            text.to_string()
        }
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut s: String = first.to_uppercase().collect();
            s.push_str(&chars.as_str().to_lowercase());
            s
        }
        None => String::new(),
    }
}

fn pascal_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut s: String = first.to_uppercase().collect();
                    s.push_str(chars.as_str());
                    s
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Counts reported by the count-selection action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionStats {
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
}

impl SelectionStats {
    pub fn of(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.lines().count(),
        }
    }
}

impl std::fmt::Display for SelectionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} characters, {} words, {} lines",
            self.chars, self.words, self.lines
        )
    }
}
