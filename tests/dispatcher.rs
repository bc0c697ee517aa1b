use casecon::action::Action;
use casecon::dispatcher::Dispatcher;
use casecon::keys::KeyId;
use casecon::registry::ShortcutRegistry;
use casecon::settings::{MatchPolicy, Settings};
use std::collections::HashSet;
use std::time::{Duration, Instant};

fn held(chars: &str, modifiers: &[KeyId]) -> HashSet<KeyId> {
    let mut set: HashSet<KeyId> = chars.chars().filter_map(KeyId::from_char).collect();
    set.extend(modifiers.iter().copied());
    set
}

const MODS: [KeyId; 3] = [KeyId::CONTROL, KeyId::WIN, KeyId::ALT];

#[test]
fn fires_once_within_cooldown() {
    let registry = ShortcutRegistry::from_settings(&Settings::default());
    let dispatcher = Dispatcher::new(Duration::from_millis(350), MatchPolicy::Subset);
    let keys = held("u", &MODS);
    let t0 = Instant::now();

    assert_eq!(dispatcher.evaluate(&keys, &registry, t0), Some(Action::Uppercase));
    assert_eq!(
        dispatcher.evaluate(&keys, &registry, t0 + Duration::from_millis(100)),
        None
    );
    assert_eq!(
        dispatcher.evaluate(&keys, &registry, t0 + Duration::from_millis(349)),
        None
    );
    assert_eq!(
        dispatcher.evaluate(&keys, &registry, t0 + Duration::from_millis(400)),
        Some(Action::Uppercase)
    );
}

#[test]
fn cooldown_is_shared_across_actions() {
    let registry = ShortcutRegistry::from_settings(&Settings::default());
    let dispatcher = Dispatcher::new(Duration::from_millis(350), MatchPolicy::Subset);
    let t0 = Instant::now();

    assert!(dispatcher.evaluate(&held("u", &MODS), &registry, t0).is_some());
    assert_eq!(
        dispatcher.evaluate(&held("l", &MODS), &registry, t0 + Duration::from_millis(50)),
        None
    );
}

#[test]
fn disabled_dispatcher_never_fires() {
    let registry = ShortcutRegistry::from_settings(&Settings::default());
    let dispatcher = Dispatcher::new(Duration::from_millis(350), MatchPolicy::Subset);
    dispatcher.set_enabled(false);
    assert_eq!(dispatcher.evaluate(&held("u", &MODS), &registry, Instant::now()), None);
    dispatcher.set_enabled(true);
    assert_eq!(
        dispatcher.evaluate(&held("u", &MODS), &registry, Instant::now()),
        Some(Action::Uppercase)
    );
}

#[test]
fn no_match_does_not_start_cooldown() {
    let registry = ShortcutRegistry::from_settings(&Settings::default());
    let dispatcher = Dispatcher::new(Duration::from_millis(350), MatchPolicy::Subset);
    let t0 = Instant::now();
    assert_eq!(dispatcher.evaluate(&held("u", &[KeyId::CONTROL]), &registry, t0), None);
    assert_eq!(
        dispatcher.evaluate(&held("u", &MODS), &registry, t0 + Duration::from_millis(1)),
        Some(Action::Uppercase)
    );
}

#[test]
fn mark_fired_starts_the_window() {
    let registry = ShortcutRegistry::from_settings(&Settings::default());
    let dispatcher = Dispatcher::new(Duration::from_millis(350), MatchPolicy::Subset);
    let t0 = Instant::now();
    dispatcher.mark_fired(t0);
    assert_eq!(dispatcher.evaluate(&held("u", &MODS), &registry, t0), None);
}
