use crate::action::Action;
use crate::clipboard::{ClipboardAccess, KeySynth};
use crate::clock::Clock;
use crate::error::{CaseError, Result};
use crate::settings::Timing;
use crate::transform::{transform, SelectionStats};
use std::sync::{Arc, Mutex};

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Pasted { original: String, transformed: String },
    /// Same selection and action as the previous run; nothing was pasted.
    SkippedRepeat,
    Counted(SelectionStats),
}

#[derive(Debug, Clone)]
struct LastRun {
    text: String,
    action: Action,
}

/// Copy the selection, transform it, paste it back and restore the clipboard.
///
/// Runs are serialized by one lock; the clipboard is a single shared resource
/// and overlapping runs would restore each other's content.
pub struct ClipboardPipeline {
    clipboard: Arc<dyn ClipboardAccess>,
    keys: Arc<dyn KeySynth>,
    clock: Arc<dyn Clock>,
    timing: Timing,
    skip_repeated: bool,
    last: Mutex<Option<LastRun>>,
}

impl ClipboardPipeline {
    pub fn new(
        clipboard: Arc<dyn ClipboardAccess>,
        keys: Arc<dyn KeySynth>,
        clock: Arc<dyn Clock>,
        timing: Timing,
    ) -> Self {
        Self {
            clipboard,
            keys,
            clock,
            timing,
            skip_repeated: true,
            last: Mutex::new(None),
        }
    }

    pub fn skip_repeated(mut self, enabled: bool) -> Self {
        self.skip_repeated = enabled;
        self
    }

    /// Resolve `name` and run it.
    pub fn run_named(&self, name: &str) -> Result<PipelineOutcome> {
        let action: Action = name.parse()?;
        self.run(action)
    }

    pub fn run(&self, action: Action) -> Result<PipelineOutcome> {
        if action == Action::ShowWindow {
            return Err(CaseError::TransformUnknown(action.name().to_string()));
        }
        let mut last = self
            .last
            .lock()
            .map_err(|_| CaseError::Clipboard("pipeline lock poisoned".into()))?;

        let original = self.clipboard.get_text()?;
        let result = self.run_locked(action, original.as_deref(), &mut last);
        self.restore(original);

        match &result {
            Ok(outcome) => tracing::debug!(%action, ?outcome, "pipeline finished"),
            Err(err) => tracing::warn!(%action, %err, "pipeline failed"),
        }
        result
    }

    fn run_locked(
        &self,
        action: Action,
        original: Option<&str>,
        last: &mut Option<LastRun>,
    ) -> Result<PipelineOutcome> {
        let selection = self.read_selection(original)?;

        if action == Action::CountSelection {
            return Ok(PipelineOutcome::Counted(SelectionStats::of(&selection)));
        }

        if self.skip_repeated {
            if let Some(prev) = last.as_ref() {
                if prev.action == action && prev.text.to_lowercase() == selection.to_lowercase() {
                    tracing::debug!(%action, "same text and action as last run; skipping");
                    return Ok(PipelineOutcome::SkippedRepeat);
                }
            }
        }

        let transformed = transform(&selection, action);
        self.clipboard.set_text(&transformed)?;
        self.keys.paste()?;
        self.clock.sleep(self.timing.paste_settle());

        *last = Some(LastRun {
            text: selection.clone(),
            action,
        });
        Ok(PipelineOutcome::Pasted {
            original: selection,
            transformed,
        })
    }

    fn read_selection(&self, original: Option<&str>) -> Result<String> {
        self.keys.copy()?;
        let attempts = self.timing.copy_retries.max(1);
        for attempt in 1..=attempts {
            self.clock.sleep(self.timing.copy_poll());
            match self.clipboard.get_text() {
                Ok(Some(text)) if !text.is_empty() && Some(text.as_str()) != original => {
                    tracing::debug!(attempt, "selection copied");
                    return Ok(text);
                }
                Ok(_) => tracing::trace!(attempt, "clipboard unchanged"),
                Err(err) => tracing::debug!(attempt, %err, "clipboard read failed"),
            }
        }
        Err(CaseError::SelectionUnreadable { attempts })
    }

    fn restore(&self, original: Option<String>) {
        let restored = match &original {
            Some(text) => self.clipboard.set_text(text),
            None => self.clipboard.clear(),
        };
        if let Err(err) = restored {
            tracing::warn!(%err, "failed to restore clipboard");
        }
    }
}
