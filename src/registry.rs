use crate::action::Action;
use crate::combination::{binding_to_setting, parse_binding, Binding, Combination};
use crate::error::{CaseError, Result};
use crate::keys::KeyId;
use crate::settings::{MatchPolicy, Settings, SettingsStore};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Current binding of every action, in declaration order.
pub type ShortcutMap = BTreeMap<Action, Binding>;

/// Thread-safe action → combination table.
///
/// Every successful mutation is written through to the settings store. A
/// failed write keeps the new in-memory value and is retried by the next
/// mutation.
pub struct ShortcutRegistry {
    map: RwLock<ShortcutMap>,
    store: Option<Arc<dyn SettingsStore>>,
    persist_pending: AtomicBool,
}

impl ShortcutRegistry {
    pub fn new(map: ShortcutMap) -> Self {
        let mut full: ShortcutMap = Action::ALL.iter().map(|a| (*a, None)).collect();
        full.extend(map);
        Self {
            map: RwLock::new(full),
            store: None,
            persist_pending: AtomicBool::new(false),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the table from stored settings.
    ///
    /// Unknown or malformed entries are dropped. Actions missing from the file
    /// get their default binding unless another action already uses it.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut map = ShortcutMap::new();
        for (name, value) in &settings.shortcuts {
            let action = match name.parse::<Action>() {
                Ok(a) => a,
                Err(_) => {
                    tracing::warn!(%name, "ignoring shortcut for unknown action");
                    continue;
                }
            };
            match parse_binding(value) {
                Ok(Some(combo)) if map.values().any(|b| b.as_ref() == Some(&combo)) => {
                    tracing::warn!(%action, %combo, "duplicate shortcut in settings; leaving unset");
                    map.insert(action, None);
                }
                Ok(binding) => {
                    map.insert(action, binding);
                }
                Err(err) => {
                    tracing::warn!(%action, %err, "invalid shortcut in settings; leaving unset");
                    map.insert(action, None);
                }
            }
        }
        for action in Action::ALL {
            if map.contains_key(&action) {
                continue;
            }
            let default = Combination::with_recording_modifiers(action.default_key()).ok();
            let taken = map.values().any(|b| b.is_some() && *b == default);
            map.insert(action, if taken { None } else { default });
        }
        Self::new(map)
    }

    pub fn get(&self, action: Action) -> Binding {
        self.map
            .read()
            .ok()
            .and_then(|m| m.get(&action).cloned().flatten())
    }

    pub fn snapshot(&self) -> ShortcutMap {
        self.map.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// The action currently bound to `combo`, if any.
    pub fn owner_of(&self, combo: &Combination) -> Option<Action> {
        self.map.read().ok().and_then(|m| owner_in(&m, combo))
    }

    /// Bind `action` to `binding`.
    ///
    /// Rejected with [`CaseError::DuplicateCombination`] when another action
    /// already owns the combination; the table is left untouched.
    pub fn set(&self, action: Action, binding: Binding) -> Result<()> {
        {
            let mut map = self
                .map
                .write()
                .map_err(|_| CaseError::Settings("shortcut table poisoned".into()))?;
            if let Some(combo) = &binding {
                if let Some(owner) = owner_in(&map, combo).filter(|o| *o != action) {
                    return Err(CaseError::DuplicateCombination {
                        combination: combo.clone(),
                        owner,
                    });
                }
            }
            map.insert(action, binding.clone());
        }
        tracing::info!(%action, binding = %binding_to_setting(&binding), "shortcut updated");
        self.persist();
        Ok(())
    }

    /// Replace the whole table. Fails without changes if two actions share a
    /// combination.
    pub fn replace_all(&self, new_map: ShortcutMap) -> Result<()> {
        let mut seen: BTreeMap<&Combination, Action> = BTreeMap::new();
        for (action, binding) in &new_map {
            if let Some(combo) = binding {
                if let Some(owner) = seen.insert(combo, *action) {
                    return Err(CaseError::DuplicateCombination {
                        combination: combo.clone(),
                        owner,
                    });
                }
            }
        }
        {
            let mut map = self
                .map
                .write()
                .map_err(|_| CaseError::Settings("shortcut table poisoned".into()))?;
            *map = Action::ALL.iter().map(|a| (*a, None)).collect();
            map.extend(new_map);
        }
        tracing::info!("shortcut table replaced");
        self.persist();
        Ok(())
    }

    /// Find the action whose combination matches the held keys. The first
    /// match in declaration order wins.
    pub fn find_match(&self, held: &HashSet<KeyId>, policy: MatchPolicy) -> Option<Action> {
        let map = self.map.read().ok()?;
        map.iter()
            .find(|(_, binding)| match (binding, policy) {
                (Some(combo), MatchPolicy::Subset) => combo.is_subset_of(held),
                (Some(combo), MatchPolicy::Exact) => combo.is_exactly(held),
                (None, _) => false,
            })
            .map(|(action, _)| *action)
    }

    /// Table in settings form.
    pub fn to_settings(&self) -> BTreeMap<String, String> {
        self.snapshot()
            .iter()
            .map(|(action, binding)| (action.name().to_string(), binding_to_setting(binding)))
            .collect()
    }

    /// A previous write to the store failed and has not been retried yet.
    pub fn persist_pending(&self) -> bool {
        self.persist_pending.load(Ordering::SeqCst)
    }

    fn persist(&self) {
        let Some(store) = &self.store else { return };
        match store.save_shortcuts(&self.to_settings()) {
            Ok(()) => self.persist_pending.store(false, Ordering::SeqCst),
            Err(err) => {
                let err = match err {
                    CaseError::ConfigPersistFailed(_) => err,
                    other => CaseError::ConfigPersistFailed(other.to_string()),
                };
                tracing::warn!(%err, "keeping shortcut in memory only");
                self.persist_pending.store(true, Ordering::SeqCst);
            }
        }
    }
}

fn owner_in(map: &ShortcutMap, combo: &Combination) -> Option<Action> {
    map.iter()
        .find(|(_, b)| b.as_ref() == Some(combo))
        .map(|(a, _)| *a)
}
