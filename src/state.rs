//! Process-wide state of the shortcut engine, owned explicitly and shared by
//! `Arc` instead of living in globals.

use crate::action::Action;
use crate::clock::{Clock, SystemClock};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::keys::{KeyEvent, Transition};
use crate::pipeline::{ClipboardPipeline, PipelineOutcome};
use crate::recording::{KeyDisposition, RecordingOutcome, RecordingSession};
use crate::registry::{ShortcutMap, ShortcutRegistry};
use crate::settings::Settings;
use crate::tracker::PressSetTracker;
use crate::transform::{transform, SelectionStats};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Callbacks into the presentation layer.
pub trait Notifier: Send + Sync {
    fn show_window(&self);
    fn selection_counted(&self, stats: &SelectionStats);
    fn recording_finished(&self, outcome: &RecordingOutcome);
}

/// Notifier for headless use: everything goes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_window(&self) {
        tracing::info!("show window requested");
    }

    fn selection_counted(&self, stats: &SelectionStats) {
        tracing::info!(
            chars = stats.chars,
            words = stats.words,
            lines = stats.lines,
            "selection counted"
        );
    }

    fn recording_finished(&self, outcome: &RecordingOutcome) {
        match outcome {
            RecordingOutcome::Conflict {
                action,
                combination,
                owner,
                ..
            } => tracing::warn!(%action, %combination, %owner, "shortcut already assigned"),
            other => tracing::info!(action = %other.action(), ?other, "recording finished"),
        }
    }
}

/// Executes a fired action on a worker thread.
pub trait ActionRunner: Send + Sync {
    fn run(&self, action: Action) -> Result<()>;
}

/// Runs actions against the real desktop through the clipboard pipeline.
pub struct DesktopRunner {
    pipeline: ClipboardPipeline,
    notifier: Arc<dyn Notifier>,
}

impl DesktopRunner {
    pub fn new(pipeline: ClipboardPipeline, notifier: Arc<dyn Notifier>) -> Self {
        Self { pipeline, notifier }
    }
}

impl ActionRunner for DesktopRunner {
    fn run(&self, action: Action) -> Result<()> {
        if action == Action::ShowWindow {
            self.notifier.show_window();
            return Ok(());
        }
        if let PipelineOutcome::Counted(stats) = self.pipeline.run(action)? {
            self.notifier.selection_counted(&stats);
        }
        Ok(())
    }
}

pub struct CoreState {
    registry: Arc<ShortcutRegistry>,
    tracker: Arc<PressSetTracker>,
    dispatcher: Dispatcher,
    recording: RecordingSession,
    runner: Arc<dyn ActionRunner>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    clear_delay: Duration,
}

impl CoreState {
    pub fn new(
        settings: &Settings,
        registry: Arc<ShortcutRegistry>,
        runner: Arc<dyn ActionRunner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            tracker: Arc::new(PressSetTracker::new()),
            dispatcher: Dispatcher::new(settings.timing.cooldown(), settings.match_policy),
            recording: RecordingSession::new(),
            runner,
            notifier,
            clock: Arc::new(SystemClock),
            clear_delay: settings.timing.clear_delay(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &PressSetTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_active()
    }

    /// Consume key events until the sender side goes away.
    pub fn run_events(&self, events: Receiver<KeyEvent>) {
        tracing::info!("listening for shortcuts");
        for event in events {
            self.handle_event(event);
        }
        tracing::info!("key event stream closed");
    }

    /// Process one key transition. Never blocks on action work.
    pub fn handle_event(&self, event: KeyEvent) {
        let key = event.key.normalized();
        match event.transition {
            Transition::Up => self.tracker.release(key),
            Transition::Down => {
                let fresh = self.tracker.press(key);
                let now = self.clock.now();
                match self
                    .recording
                    .handle_key(key, &self.registry, &self.dispatcher, now)
                {
                    KeyDisposition::NotRecording => {}
                    KeyDisposition::Consumed => return,
                    KeyDisposition::Finished(outcome) => {
                        self.notifier.recording_finished(&outcome);
                        return;
                    }
                }
                if !fresh {
                    return;
                }
                let held = self.tracker.held();
                if let Some(action) = self.dispatcher.evaluate(&held, &self.registry, now) {
                    self.fire(action);
                }
            }
        }
    }

    fn fire(&self, action: Action) {
        tracing::info!(%action, "firing shortcut");
        let runner = Arc::clone(&self.runner);
        let spawned = thread::Builder::new()
            .name(format!("casecon-{}", action.name()))
            .spawn(move || {
                if let Err(err) = runner.run(action) {
                    tracing::warn!(%action, %err, "action failed");
                }
            });
        if let Err(err) = spawned {
            tracing::error!(%action, ?err, "failed to spawn action worker");
        }
        self.tracker
            .schedule_clear(self.clear_delay, Arc::clone(&self.clock));
    }

    /// Apply `action` to text from the in-app buffer, bypassing the clipboard.
    pub fn dispatch_manual(&self, action: Action, text: &str) -> String {
        match action {
            Action::ShowWindow => self.notifier.show_window(),
            Action::CountSelection => self.notifier.selection_counted(&SelectionStats::of(text)),
            _ => {}
        }
        transform(text, action)
    }

    /// Start defining a new shortcut for `action`. The result arrives through
    /// [`Notifier::recording_finished`].
    pub fn begin_recording(&self, action: Action) {
        if let Some(prior) = self.recording.begin(action, &self.registry, &self.dispatcher) {
            self.notifier.recording_finished(&prior);
        }
    }

    pub fn cancel_recording(&self) {
        if let Some(outcome) = self.recording.cancel(&self.dispatcher, self.clock.now()) {
            self.notifier.recording_finished(&outcome);
        }
    }

    pub fn get_current_bindings(&self) -> ShortcutMap {
        self.registry.snapshot()
    }
}
