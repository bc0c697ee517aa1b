use casecon::action::Action;
use casecon::clipboard::{ClipboardAccess, KeySynth};
use casecon::clock::{Clock, ManualClock, SystemClock};
use casecon::error::{CaseError, Result};
use casecon::pipeline::{ClipboardPipeline, PipelineOutcome};
use casecon::settings::Timing;
use casecon::transform::SelectionStats;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct FakeClipboard {
    text: Mutex<Option<String>>,
}

impl FakeClipboard {
    fn holding(text: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            text: Mutex::new(text.map(str::to_string)),
        })
    }

    fn current(&self) -> Option<String> {
        self.text.lock().unwrap().clone()
    }
}

impl ClipboardAccess for FakeClipboard {
    fn get_text(&self) -> Result<Option<String>> {
        Ok(self.current())
    }

    fn set_text(&self, text: &str) -> Result<()> {
        *self.text.lock().unwrap() = Some(text.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.text.lock().unwrap() = None;
        Ok(())
    }
}

/// Stands in for the foreground application: copy puts the selection on the
/// clipboard, paste records what the clipboard held.
struct FakeApp {
    clipboard: Arc<FakeClipboard>,
    selection: Option<String>,
    pasted: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeApp {
    fn new(clipboard: Arc<FakeClipboard>, selection: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            clipboard,
            selection: selection.map(str::to_string),
            pasted: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        })
    }

    fn pasted(&self) -> Vec<String> {
        self.pasted.lock().unwrap().clone()
    }
}

impl KeySynth for FakeApp {
    fn copy(&self) -> Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(selection) = &self.selection {
            self.clipboard.set_text(selection)?;
        }
        Ok(())
    }

    fn paste(&self) -> Result<()> {
        self.active.fetch_sub(1, Ordering::SeqCst);
        let text = self.clipboard.current().unwrap_or_default();
        self.pasted.lock().unwrap().push(text);
        Ok(())
    }
}

fn pipeline(
    clipboard: &Arc<FakeClipboard>,
    app: &Arc<FakeApp>,
    clock: Arc<dyn Clock>,
) -> ClipboardPipeline {
    ClipboardPipeline::new(clipboard.clone(), app.clone(), clock, Timing::default())
}

#[test]
fn pastes_transformed_text_and_restores_clipboard() {
    let clipboard = FakeClipboard::holding(Some("previous"));
    let app = FakeApp::new(clipboard.clone(), Some("hello world"));
    let pipeline = pipeline(&clipboard, &app, Arc::new(ManualClock::new()));

    let outcome = pipeline.run(Action::SnakeCase).unwrap();
    assert_eq!(
        outcome,
        PipelineOutcome::Pasted {
            original: "hello world".into(),
            transformed: "hello_world".into(),
        }
    );
    assert_eq!(app.pasted(), vec!["hello_world".to_string()]);
    assert_eq!(clipboard.current().as_deref(), Some("previous"));
}

#[test]
fn empty_clipboard_is_cleared_again() {
    let clipboard = FakeClipboard::holding(None);
    let app = FakeApp::new(clipboard.clone(), Some("Hello World"));
    let pipeline = pipeline(&clipboard, &app, Arc::new(ManualClock::new()));

    pipeline.run(Action::KebabCase).unwrap();
    assert_eq!(app.pasted(), vec!["hello-world".to_string()]);
    assert_eq!(clipboard.current(), None);
}

#[test]
fn unreadable_selection_aborts_without_paste() {
    let clipboard = FakeClipboard::holding(Some("previous"));
    let app = FakeApp::new(clipboard.clone(), None);
    let clock = Arc::new(ManualClock::new());
    let pipeline = pipeline(&clipboard, &app, clock.clone());

    let err = pipeline.run(Action::Uppercase).unwrap_err();
    assert!(matches!(err, CaseError::SelectionUnreadable { attempts: 10 }));
    assert!(app.pasted().is_empty());
    assert_eq!(clipboard.current().as_deref(), Some("previous"));
    // Ten polls of 50 ms each.
    assert_eq!(clock.elapsed(), Duration::from_millis(500));
}

#[test]
fn repeated_selection_is_skipped() {
    let clipboard = FakeClipboard::holding(Some("previous"));
    let app = FakeApp::new(clipboard.clone(), Some("Hello World"));
    let pipeline = pipeline(&clipboard, &app, Arc::new(ManualClock::new()));

    assert!(matches!(
        pipeline.run(Action::Uppercase).unwrap(),
        PipelineOutcome::Pasted { .. }
    ));
    assert_eq!(
        pipeline.run(Action::Uppercase).unwrap(),
        PipelineOutcome::SkippedRepeat
    );
    // A different action on the same text still runs.
    assert!(matches!(
        pipeline.run(Action::Lowercase).unwrap(),
        PipelineOutcome::Pasted { .. }
    ));
    assert_eq!(app.pasted().len(), 2);
    assert_eq!(clipboard.current().as_deref(), Some("previous"));
}

#[test]
fn repeat_skip_can_be_disabled() {
    let clipboard = FakeClipboard::holding(Some("previous"));
    let app = FakeApp::new(clipboard.clone(), Some("abc"));
    let pipeline =
        pipeline(&clipboard, &app, Arc::new(ManualClock::new())).skip_repeated(false);

    pipeline.run(Action::Uppercase).unwrap();
    pipeline.run(Action::Uppercase).unwrap();
    assert_eq!(app.pasted().len(), 2);
}

#[test]
fn count_reports_without_pasting() {
    let clipboard = FakeClipboard::holding(Some("previous"));
    let app = FakeApp::new(clipboard.clone(), Some("two words"));
    let pipeline = pipeline(&clipboard, &app, Arc::new(ManualClock::new()));

    assert_eq!(
        pipeline.run(Action::CountSelection).unwrap(),
        PipelineOutcome::Counted(SelectionStats::of("two words"))
    );
    assert!(app.pasted().is_empty());
    assert_eq!(clipboard.current().as_deref(), Some("previous"));
}

#[test]
fn unknown_names_and_window_action_are_rejected() {
    let clipboard = FakeClipboard::holding(Some("previous"));
    let app = FakeApp::new(clipboard.clone(), Some("text"));
    let pipeline = pipeline(&clipboard, &app, Arc::new(ManualClock::new()));

    assert!(matches!(
        pipeline.run_named("zigzag"),
        Err(CaseError::TransformUnknown(_))
    ));
    assert!(matches!(
        pipeline.run(Action::ShowWindow),
        Err(CaseError::TransformUnknown(_))
    ));
    assert_eq!(
        pipeline.run_named("snake_case").unwrap(),
        PipelineOutcome::Pasted {
            original: "text".into(),
            transformed: "text".into(),
        }
    );
}

#[test]
fn concurrent_runs_are_serialized() {
    let clipboard = FakeClipboard::holding(Some("previous"));
    let app = FakeApp::new(clipboard.clone(), Some("some text"));
    let timing = Timing {
        copy_poll_ms: 5,
        paste_settle_ms: 5,
        ..Timing::default()
    };
    let pipeline = Arc::new(
        ClipboardPipeline::new(clipboard.clone(), app.clone(), Arc::new(SystemClock), timing)
            .skip_repeated(false),
    );

    let handles: Vec<_> = [Action::Uppercase, Action::SnakeCase, Action::KebabCase]
        .into_iter()
        .map(|action| {
            let pipeline = pipeline.clone();
            thread::spawn(move || pipeline.run(action))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }

    assert_eq!(app.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(app.pasted().len(), 3);
    assert_eq!(clipboard.current().as_deref(), Some("previous"));
}
