use crate::action::Action;
use crate::combination::Combination;
use thiserror::Error;

/// Errors raised by the capture and clipboard pipeline.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The global keyboard hook could not be installed. Fatal at startup.
    #[error("Failed to install global keyboard hook: {0}")]
    HookInstallFailed(String),
    /// No new clipboard content showed up after the copy keystroke.
    #[error("Could not read the selected text after {attempts} attempts")]
    SelectionUnreadable { attempts: u32 },
    /// The requested action name has no bound transform.
    #[error("Unknown transform: '{0}'")]
    TransformUnknown(String),
    /// The combination is already bound to another action.
    #[error("{combination} is already assigned to {owner}")]
    DuplicateCombination {
        combination: Combination,
        owner: Action,
    },
    /// Writing the settings file failed. The in-memory value stays active.
    #[error("Failed to persist settings: {0}")]
    ConfigPersistFailed(String),
    #[error("Invalid key combination: '{0}'")]
    InvalidCombination(String),
    #[error("Failed to load settings: {0}")]
    Settings(String),
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Failed to synthesize keystroke: {0}")]
    KeySynth(String),
}

pub type Result<T> = std::result::Result<T, CaseError>;
