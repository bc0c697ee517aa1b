use anyhow::Context;
use casecon::action::Action;
use casecon::clipboard::{ClipboardAccess, SendInputKeys, SystemClipboard};
use casecon::clock::SystemClock;
use casecon::combination::{binding_to_setting, parse_binding};
use casecon::hook::KeyHook;
use casecon::keys::{KeyId, Transition};
use casecon::pipeline::ClipboardPipeline;
use casecon::registry::ShortcutRegistry;
use casecon::settings::{JsonSettingsStore, SettingsStore};
use casecon::state::{CoreState, DesktopRunner, LogNotifier};
use casecon::{logging, transform};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "casecon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for global shortcuts (default)
    Run,
    /// Convert text with one of the case modes
    Transform {
        /// Mode name, e.g. snakecase
        mode: String,
        text: String,
    },
    /// List the configured shortcuts
    Bindings,
    /// Assign a shortcut, e.g. `set kebabcase ctrl+win+alt+k` or `set count NONE`
    Set { action: Action, combination: String },
    /// Print the name and code of every key pressed until Esc
    Keys,
    /// Check that the clipboard can be written and restored
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = Arc::new(JsonSettingsStore::new(
        cli.settings.unwrap_or_else(JsonSettingsStore::default_path),
    ));
    // The first-run write happens before the subscriber exists; report it here.
    let first_run = !store.path().exists();
    let settings = store.load_or_init()?;
    logging::init(cli.debug || settings.debug_logging, settings.log_file.clone());
    if first_run {
        tracing::info!(path = %store.path().display(), "created settings with default shortcuts");
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(store)?,
        Commands::Transform { mode, text } => {
            println!("{}", transform::transform_named(&text, &mode));
        }
        Commands::Bindings => {
            let registry = ShortcutRegistry::from_settings(&settings);
            for (action, binding) in registry.snapshot() {
                let shown = binding.map_or_else(|| "(none)".to_string(), |c| c.to_string());
                println!("{:<14} {:<22} {}", action.name(), shown, action.label());
            }
        }
        Commands::Set {
            action,
            combination,
        } => {
            let binding = parse_binding(&combination)?;
            let registry = ShortcutRegistry::from_settings(&settings).with_store(store.clone());
            registry.set(action, binding.clone())?;
            if registry.persist_pending() {
                anyhow::bail!("shortcut updated but settings could not be written");
            }
            println!("{} -> {}", action.name(), binding_to_setting(&binding));
        }
        Commands::Keys => print_keys()?,
        Commands::Check => check_clipboard()?,
    }

    Ok(())
}

fn run(store: Arc<JsonSettingsStore>) -> anyhow::Result<()> {
    let settings = store.load()?;
    let registry = Arc::new(ShortcutRegistry::from_settings(&settings).with_store(store.clone()));
    // Fill in entries that were missing or invalid in the file.
    if registry.to_settings() != settings.shortcuts {
        if let Err(err) = store.save_shortcuts(&registry.to_settings()) {
            tracing::warn!(%err, "could not normalise stored shortcuts");
        }
    }

    let clock = Arc::new(SystemClock);
    let notifier = Arc::new(LogNotifier);
    let pipeline = ClipboardPipeline::new(
        Arc::new(SystemClipboard),
        Arc::new(SendInputKeys),
        clock.clone(),
        settings.timing,
    )
    .skip_repeated(settings.skip_repeated);
    let runner = Arc::new(DesktopRunner::new(pipeline, notifier.clone()));
    let core = CoreState::new(&settings, registry, runner, notifier).with_clock(clock);

    let mut hook = KeyHook::install().context("global shortcuts are unavailable")?;
    let events = hook
        .events()
        .context("keyboard hook produced no event stream")?;
    core.run_events(events);
    Ok(())
}

fn print_keys() -> anyhow::Result<()> {
    let mut hook = KeyHook::install()?;
    let events = hook
        .events()
        .context("keyboard hook produced no event stream")?;
    println!("Press keys to see their names. Esc quits.");
    let mut held: BTreeSet<KeyId> = BTreeSet::new();
    for event in events {
        match event.transition {
            Transition::Up => {
                held.remove(&event.key);
            }
            Transition::Down => {
                if !held.insert(event.key) {
                    continue;
                }
                let combo = held.iter().map(|k| k.name()).collect::<Vec<_>>().join("+");
                let codes = held.iter().map(|k| k.0.to_string()).collect::<Vec<_>>().join("+");
                println!("{:<10} code {:<4} held {combo} ({codes})", event.key.name(), event.key.0);
                if event.key == KeyId::ESCAPE {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn check_clipboard() -> anyhow::Result<()> {
    const PROBE: &str = "CaseCon clipboard check";
    let clipboard = SystemClipboard;
    let original = clipboard.get_text()?;
    clipboard.set_text(PROBE)?;
    let read_back = clipboard.get_text()?;
    match &original {
        Some(text) => clipboard.set_text(text)?,
        None => clipboard.clear()?,
    }
    if read_back.as_deref() == Some(PROBE) {
        println!("Clipboard read/write works and was restored.");
        Ok(())
    } else {
        anyhow::bail!("clipboard returned {read_back:?} instead of the probe text")
    }
}
