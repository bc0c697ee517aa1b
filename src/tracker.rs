use crate::clock::Clock;
use crate::keys::KeyId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Set of keys currently held down.
///
/// Release events can get lost when the foreground application swallows a
/// key, so the owner clears the set a short moment after every dispatch.
#[derive(Debug, Default)]
pub struct PressSetTracker {
    held: Mutex<HashSet<KeyId>>,
}

impl PressSetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down. Returns `false` for auto-repeat of a held key.
    pub fn press(&self, key: KeyId) -> bool {
        match self.held.lock() {
            Ok(mut held) => held.insert(key),
            Err(_) => false,
        }
    }

    pub fn release(&self, key: KeyId) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&key);
        }
    }

    pub fn held(&self) -> HashSet<KeyId> {
        self.held.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.held.lock().map(|h| h.is_empty()).unwrap_or(true)
    }

    pub fn clear(&self) {
        if let Ok(mut held) = self.held.lock() {
            if !held.is_empty() {
                tracing::debug!(stale = held.len(), "clearing held keys");
            }
            held.clear();
        }
    }

    /// Clear the whole set once `delay` has passed on `clock`.
    pub fn schedule_clear(self: &Arc<Self>, delay: Duration, clock: Arc<dyn Clock>) {
        let tracker = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("casecon-held-reset".into())
            .spawn(move || {
                clock.sleep(delay);
                tracker.clear();
            });
        if let Err(err) = spawned {
            tracing::warn!(?err, "failed to spawn held-key reset; clearing now");
            self.clear();
        }
    }
}
