use crate::action::Action;
use crate::keys::KeyId;
use crate::registry::ShortcutRegistry;
use crate::settings::MatchPolicy;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Decides whether a key-down fires an action.
///
/// A single global `last_fired` instant gates every action, so holding a
/// combination cannot fire twice within the cooldown.
#[derive(Debug)]
pub struct Dispatcher {
    enabled: AtomicBool,
    last_fired: Mutex<Option<Instant>>,
    cooldown: Duration,
    policy: MatchPolicy,
}

impl Dispatcher {
    pub fn new(cooldown: Duration, policy: MatchPolicy) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            last_fired: Mutex::new(None),
            cooldown,
            policy,
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Start the cooldown window at `now` without firing.
    pub fn mark_fired(&self, now: Instant) {
        if let Ok(mut last) = self.last_fired.lock() {
            *last = Some(now);
        }
    }

    /// Returns the action to fire for the held keys, if the match and the
    /// cooldown allow it.
    pub fn evaluate(
        &self,
        held: &HashSet<KeyId>,
        registry: &ShortcutRegistry,
        now: Instant,
    ) -> Option<Action> {
        if !self.is_enabled() {
            return None;
        }
        let action = registry.find_match(held, self.policy)?;

        let mut last = self.last_fired.lock().ok()?;
        if let Some(prev) = *last {
            let since = now.saturating_duration_since(prev);
            if since < self.cooldown {
                tracing::debug!(%action, ?since, "suppressed by cooldown");
                return None;
            }
        }
        *last = Some(now);
        tracing::debug!(%action, "shortcut matched");
        Some(action)
    }
}
