use crate::error::{CaseError, Result};
use crate::keys::{parse_key, KeyId};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Largest number of simultaneously held keys a combination may contain.
pub const MAX_KEYS: usize = 4;

/// Settings literal for an unset binding.
pub const UNSET: &str = "NONE";

/// Modifiers every recorded shortcut is bound under: Ctrl+Win+Alt.
pub const RECORDING_MODIFIERS: [KeyId; 3] = [KeyId::CONTROL, KeyId::WIN, KeyId::ALT];

/// A set of keys that must be held together to trigger an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Combination {
    keys: BTreeSet<KeyId>,
}

/// `None` means the action has no shortcut.
pub type Binding = Option<Combination>;

impl Combination {
    pub fn new<I: IntoIterator<Item = KeyId>>(keys: I) -> Result<Self> {
        let keys: BTreeSet<KeyId> = keys.into_iter().map(KeyId::normalized).collect();
        if keys.is_empty() || keys.len() > MAX_KEYS {
            let listed = keys.iter().map(|k| k.name()).collect::<Vec<_>>().join("+");
            return Err(CaseError::InvalidCombination(listed));
        }
        Ok(Self { keys })
    }

    /// The fixed recording modifiers plus `key`.
    pub fn with_recording_modifiers(key: KeyId) -> Result<Self> {
        Self::new(RECORDING_MODIFIERS.into_iter().chain(std::iter::once(key)))
    }

    pub fn keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.keys.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: KeyId) -> bool {
        self.keys.contains(&key)
    }

    /// Every key of the combination is currently held.
    pub fn is_subset_of(&self, held: &HashSet<KeyId>) -> bool {
        self.keys.iter().all(|k| held.contains(k))
    }

    /// The held set is exactly this combination.
    pub fn is_exactly(&self, held: &HashSet<KeyId>) -> bool {
        held.len() == self.keys.len() && self.is_subset_of(held)
    }

    /// Settings representation: `+`-joined decimal key codes.
    pub fn to_setting(&self) -> String {
        self.keys
            .iter()
            .map(|k| k.0.to_string())
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in self.display_order() {
            if !first {
                f.write_str("+")?;
            }
            first = false;
            write!(f, "{}", key.name())?;
        }
        Ok(())
    }
}

impl Combination {
    // Modifiers first, in the conventional Ctrl, Win, Alt, Shift order.
    fn display_order(&self) -> Vec<KeyId> {
        const ORDER: [KeyId; 4] = [KeyId::CONTROL, KeyId::WIN, KeyId::ALT, KeyId::SHIFT];
        let mut out: Vec<KeyId> = ORDER.into_iter().filter(|k| self.contains(*k)).collect();
        out.extend(self.keys.iter().copied().filter(|k| !k.is_modifier()));
        out
    }
}

/// Parse a settings value into a binding.
///
/// Accepts `+`-joined key codes (`17+91+18+85`), key names (`ctrl+win+alt+u`)
/// or the literal `NONE`.
pub fn parse_binding(s: &str) -> Result<Binding> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNSET) {
        return Ok(None);
    }
    let mut keys = Vec::new();
    for part in trimmed.split('+') {
        let key = parse_key(part).ok_or_else(|| CaseError::InvalidCombination(s.to_string()))?;
        keys.push(key);
    }
    Combination::new(keys)
        .map(Some)
        .map_err(|_| CaseError::InvalidCombination(s.to_string()))
}

/// Settings representation of a binding.
pub fn binding_to_setting(binding: &Binding) -> String {
    match binding {
        Some(combo) => combo.to_setting(),
        None => UNSET.to_string(),
    }
}
