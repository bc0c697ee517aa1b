use crate::error::CaseError;
use crate::keys::KeyId;
use std::fmt;
use std::str::FromStr;

/// Everything a shortcut can be bound to.
///
/// Declaration order is also the dispatch priority: when several
/// combinations match the held keys, the first action wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Uppercase,
    Lowercase,
    TitleCase,
    SentenceCase,
    MacroCase,
    SnakeCase,
    PascalCase,
    KebabCase,
    CountSelection,
    ShowWindow,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::Uppercase,
        Action::Lowercase,
        Action::TitleCase,
        Action::SentenceCase,
        Action::MacroCase,
        Action::SnakeCase,
        Action::PascalCase,
        Action::KebabCase,
        Action::CountSelection,
        Action::ShowWindow,
    ];

    /// Key used in the settings file.
    pub fn name(self) -> &'static str {
        match self {
            Action::Uppercase => "uppercase",
            Action::Lowercase => "lowercase",
            Action::TitleCase => "titlecase",
            Action::SentenceCase => "sentencecase",
            Action::MacroCase => "macrocase",
            Action::SnakeCase => "snakecase",
            Action::PascalCase => "pascalcase",
            Action::KebabCase => "kebabcase",
            Action::CountSelection => "count",
            Action::ShowWindow => "show_window",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Uppercase => "UPPERCASE",
            Action::Lowercase => "lowercase",
            Action::TitleCase => "Title Case",
            Action::SentenceCase => "Sentence case",
            Action::MacroCase => "MACRO_CASE",
            Action::SnakeCase => "snake_case",
            Action::PascalCase => "PascalCase",
            Action::KebabCase => "kebab-case",
            Action::CountSelection => "Count selection",
            Action::ShowWindow => "Show window",
        }
    }

    /// True for the case conversions that paste their result back.
    pub fn is_case_mode(self) -> bool {
        !matches!(self, Action::CountSelection | Action::ShowWindow)
    }

    /// Letter bound under Ctrl+Win+Alt on first run.
    pub fn default_key(self) -> KeyId {
        let letter = match self {
            Action::Uppercase => 'U',
            Action::Lowercase => 'L',
            Action::TitleCase => 'T',
            Action::SentenceCase => 'S',
            Action::MacroCase => 'M',
            Action::SnakeCase => 'Z',
            Action::PascalCase => 'P',
            Action::KebabCase => 'K',
            Action::CountSelection => 'N',
            Action::ShowWindow => 'W',
        };
        KeyId(letter as u32)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "uppercase" | "upper" => Ok(Action::Uppercase),
            "lowercase" | "lower" => Ok(Action::Lowercase),
            "titlecase" | "title" => Ok(Action::TitleCase),
            "sentencecase" | "sentence" => Ok(Action::SentenceCase),
            "macrocase" | "uppersnakecase" | "screamingsnakecase" => Ok(Action::MacroCase),
            "snakecase" | "snake" => Ok(Action::SnakeCase),
            "pascalcase" | "pascal" => Ok(Action::PascalCase),
            "kebabcase" | "kebab" => Ok(Action::KebabCase),
            "count" | "countselection" => Ok(Action::CountSelection),
            "showwindow" | "show" => Ok(Action::ShowWindow),
            _ => Err(CaseError::TransformUnknown(s.to_string())),
        }
    }
}
