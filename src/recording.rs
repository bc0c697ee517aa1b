//! Defining a new shortcut by pressing its final key.
//!
//! While a session is active normal dispatch is disabled for every action.
//! The user presses one letter, digit or function key and the action is bound
//! to Ctrl+Win+Alt plus that key. Esc/Enter cancel, Delete unbinds.

use crate::action::Action;
use crate::combination::{Binding, Combination};
use crate::dispatcher::Dispatcher;
use crate::error::CaseError;
use crate::keys::KeyId;
use crate::registry::ShortcutRegistry;
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingState {
    pub target: Action,
    /// Binding to fall back to on cancel or conflict.
    pub rollback: Binding,
}

/// What a key-down means to an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingStep {
    Continue,
    Cancel,
    Clear,
    Capture(Combination),
}

/// Result of feeding one key-down to [`RecordingSession::handle_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisposition {
    /// No session is active; the key belongs to normal dispatch.
    NotRecording,
    /// Swallowed by the session, which keeps waiting.
    Consumed,
    Finished(RecordingOutcome),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingOutcome {
    Assigned {
        action: Action,
        combination: Combination,
    },
    Cleared {
        action: Action,
    },
    Cancelled {
        action: Action,
        restored: Binding,
    },
    /// The combination belongs to `owner`; `action` keeps `restored`.
    Conflict {
        action: Action,
        combination: Combination,
        owner: Action,
        restored: Binding,
    },
}

impl RecordingOutcome {
    pub fn action(&self) -> Action {
        match self {
            RecordingOutcome::Assigned { action, .. }
            | RecordingOutcome::Cleared { action }
            | RecordingOutcome::Cancelled { action, .. }
            | RecordingOutcome::Conflict { action, .. } => *action,
        }
    }
}

/// Map a key-down to a recording step.
pub fn classify(key: KeyId) -> RecordingStep {
    let key = key.normalized();
    match key {
        KeyId::ESCAPE | KeyId::ENTER => RecordingStep::Cancel,
        KeyId::DELETE => RecordingStep::Clear,
        _ if key.alphanumeric().is_some() || key.function_number().is_some() => {
            match Combination::with_recording_modifiers(key) {
                Ok(combo) => RecordingStep::Capture(combo),
                Err(_) => RecordingStep::Continue,
            }
        }
        _ => RecordingStep::Continue,
    }
}

/// The one process-wide recording slot.
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: Mutex<Option<RecordingState>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn current(&self) -> Option<RecordingState> {
        self.state.lock().ok().and_then(|s| s.clone())
    }

    /// Start recording for `action`. A session already in progress is
    /// cancelled first and its outcome returned.
    pub fn begin(
        &self,
        action: Action,
        registry: &ShortcutRegistry,
        dispatcher: &Dispatcher,
    ) -> Option<RecordingOutcome> {
        let Ok(mut slot) = self.state.lock() else {
            return None;
        };
        let prior = slot.take().map(|prev| {
            tracing::info!(action = %prev.target, "recording superseded");
            RecordingOutcome::Cancelled {
                action: prev.target,
                restored: prev.rollback,
            }
        });
        dispatcher.set_enabled(false);
        *slot = Some(RecordingState {
            target: action,
            rollback: registry.get(action),
        });
        tracing::info!(%action, "recording shortcut");
        prior
    }

    /// Abort the active session, keeping the previous binding.
    pub fn cancel(&self, dispatcher: &Dispatcher, now: Instant) -> Option<RecordingOutcome> {
        let mut slot = self.state.lock().ok()?;
        let state = slot.take()?;
        Self::reenable(dispatcher, now);
        tracing::info!(action = %state.target, "recording cancelled");
        Some(RecordingOutcome::Cancelled {
            action: state.target,
            restored: state.rollback,
        })
    }

    /// Feed a key-down to the session.
    pub fn handle_key(
        &self,
        key: KeyId,
        registry: &ShortcutRegistry,
        dispatcher: &Dispatcher,
        now: Instant,
    ) -> KeyDisposition {
        let Ok(mut slot) = self.state.lock() else {
            return KeyDisposition::NotRecording;
        };
        let Some(state) = slot.clone() else {
            return KeyDisposition::NotRecording;
        };

        let outcome = match classify(key) {
            RecordingStep::Continue => return KeyDisposition::Consumed,
            RecordingStep::Cancel => RecordingOutcome::Cancelled {
                action: state.target,
                restored: state.rollback,
            },
            RecordingStep::Clear => match registry.set(state.target, None) {
                Ok(()) => RecordingOutcome::Cleared {
                    action: state.target,
                },
                Err(err) => {
                    tracing::warn!(%err, "failed to clear shortcut");
                    RecordingOutcome::Cancelled {
                        action: state.target,
                        restored: state.rollback,
                    }
                }
            },
            RecordingStep::Capture(combo) => {
                match registry.set(state.target, Some(combo.clone())) {
                    Ok(()) => RecordingOutcome::Assigned {
                        action: state.target,
                        combination: combo,
                    },
                    Err(CaseError::DuplicateCombination { owner, .. }) => {
                        tracing::info!(action = %state.target, %combo, %owner, "shortcut already in use");
                        RecordingOutcome::Conflict {
                            action: state.target,
                            combination: combo,
                            owner,
                            restored: state.rollback,
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%err, "failed to assign shortcut");
                        RecordingOutcome::Cancelled {
                            action: state.target,
                            restored: state.rollback,
                        }
                    }
                }
            }
        };

        *slot = None;
        Self::reenable(dispatcher, now);
        KeyDisposition::Finished(outcome)
    }

    // The key that ended the session is still held; the cooldown keeps it from
    // firing the shortcut it just defined.
    fn reenable(dispatcher: &Dispatcher, now: Instant) {
        dispatcher.mark_fired(now);
        dispatcher.set_enabled(true);
    }
}
