use casecon::action::Action;
use casecon::combination::Combination;
use casecon::keys::KeyId;
use casecon::registry::ShortcutRegistry;
use casecon::settings::{default_shortcuts, JsonSettingsStore, MatchPolicy, Settings, SettingsStore};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

#[test]
fn first_run_writes_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("casecon").join("settings.json");
    let store = JsonSettingsStore::new(&path);
    assert!(!store.path().exists());

    let settings = store.load_or_init().unwrap();
    assert!(store.path().exists());
    assert_eq!(store.path(), path.as_path());
    assert_eq!(settings.shortcuts, default_shortcuts());
    assert_eq!(settings.shortcuts["uppercase"], "17+18+85+91");
    assert_eq!(settings.shortcuts["show_window"], "17+18+87+91");
    assert!(settings.skip_repeated);
    assert_eq!(settings.match_policy, MatchPolicy::Subset);

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, settings);
}

#[test]
fn reads_legacy_flags_and_named_shortcuts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "shortcuts": { "uppercase": "ctrl+win+alt+u", "kebab_case": "NONE" },
            "start_with_windows": 1,
            "start_hidden_tray": 0
        }"#,
    )
    .unwrap();

    let settings = JsonSettingsStore::new(&path).load().unwrap();
    assert!(settings.start_with_os);
    assert!(!settings.start_hidden);
    assert_eq!(settings.timing.cooldown_ms, 350);
    assert!(settings.skip_repeated);

    let registry = ShortcutRegistry::from_settings(&settings);
    assert_eq!(
        registry.get(Action::Uppercase),
        Some(Combination::with_recording_modifiers(KeyId::from_char('u').unwrap()).unwrap())
    );
    assert_eq!(registry.get(Action::KebabCase), None);
    // Missing entries fall back to their defaults.
    assert_eq!(
        registry.get(Action::SnakeCase),
        Some(Combination::with_recording_modifiers(KeyId::from_char('z').unwrap()).unwrap())
    );
}

#[test]
fn save_shortcuts_keeps_other_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let store = JsonSettingsStore::new(&path);
    let mut settings = Settings::default();
    settings.debug_logging = true;
    settings.match_policy = MatchPolicy::Exact;
    store.save(&settings).unwrap();

    let mut shortcuts = BTreeMap::new();
    shortcuts.insert("uppercase".to_string(), "NONE".to_string());
    store.save_shortcuts(&shortcuts).unwrap();

    let reloaded = store.load().unwrap();
    assert!(reloaded.debug_logging);
    assert_eq!(reloaded.match_policy, MatchPolicy::Exact);
    assert_eq!(reloaded.shortcuts, shortcuts);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(JsonSettingsStore::new(&path).load().is_err());
}

#[test]
fn existing_file_is_not_rewritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let stored = r#"{ "shortcuts": { "uppercase": "NONE" } }"#;
    fs::write(&path, stored).unwrap();

    let settings = JsonSettingsStore::new(&path).load_or_init().unwrap();
    assert_eq!(settings.shortcuts.len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), stored);
}
