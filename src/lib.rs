//! Global-shortcut case conversion for selected text.
//!
//! A low-level keyboard hook ([`hook`]) streams key transitions into
//! [`state::CoreState`], which tracks held keys, matches them against the
//! [`registry::ShortcutRegistry`] and fires actions on worker threads. Case
//! actions run through the [`pipeline::ClipboardPipeline`]: copy the
//! selection, transform it, paste it back and restore the clipboard.

pub mod action;
pub mod clipboard;
pub mod clock;
pub mod combination;
pub mod dispatcher;
pub mod error;
pub mod hook;
pub mod keys;
pub mod logging;
pub mod pipeline;
pub mod recording;
pub mod registry;
pub mod settings;
pub mod state;
pub mod tracker;
pub mod transform;

pub use action::Action;
pub use combination::{Binding, Combination};
pub use error::CaseError;
pub use keys::{KeyEvent, KeyId, Transition};
pub use state::CoreState;
pub use transform::transform;
