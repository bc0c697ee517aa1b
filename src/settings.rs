use crate::action::Action;
use crate::combination::{binding_to_setting, Combination};
use crate::error::{CaseError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How a registered combination is compared against the held keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Fires when all keys of the combination are held, extra keys allowed.
    #[default]
    Subset,
    /// Fires only when the held keys are exactly the combination.
    Exact,
}

/// Delays and retry budgets of the capture pipeline, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Minimum gap between two dispatches.
    pub cooldown_ms: u64,
    /// Delay after a dispatch before the held keys are forgotten.
    pub clear_delay_ms: u64,
    /// Clipboard polls after the copy keystroke.
    pub copy_retries: u32,
    pub copy_poll_ms: u64,
    /// Wait after the paste keystroke before restoring the clipboard.
    pub paste_settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            cooldown_ms: 350,
            clear_delay_ms: 250,
            copy_retries: 10,
            copy_poll_ms: 50,
            paste_settle_ms: 100,
        }
    }
}

impl Timing {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn copy_poll(&self) -> Duration {
        Duration::from_millis(self.copy_poll_ms)
    }

    pub fn paste_settle(&self) -> Duration {
        Duration::from_millis(self.paste_settle_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Action name to combination string (`17+91+18+85` or `NONE`).
    #[serde(default)]
    pub shortcuts: BTreeMap<String, String>,
    /// Stored for the autostart integration; not acted on by the core.
    #[serde(default, alias = "start_with_windows", deserialize_with = "flag")]
    pub start_with_os: bool,
    #[serde(default, alias = "start_hidden_tray", deserialize_with = "flag")]
    pub start_hidden: bool,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub match_policy: MatchPolicy,
    /// Skip a run whose selection and action equal the previous run.
    #[serde(default = "default_skip_repeated")]
    pub skip_repeated: bool,
    #[serde(default)]
    pub timing: Timing,
}

fn default_skip_repeated() -> bool {
    true
}

// Older settings files store flags as 0/1.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// First-run shortcuts: Ctrl+Win+Alt plus one letter per action.
pub fn default_shortcuts() -> BTreeMap<String, String> {
    Action::ALL
        .iter()
        .map(|action| {
            let binding = Combination::with_recording_modifiers(action.default_key()).ok();
            (action.name().to_string(), binding_to_setting(&binding))
        })
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shortcuts: default_shortcuts(),
            start_with_os: false,
            start_hidden: false,
            debug_logging: false,
            log_file: None,
            match_policy: MatchPolicy::Subset,
            skip_repeated: default_skip_repeated(),
            timing: Timing::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Durable storage of the settings record.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;

    /// Replace only the shortcut table, keeping every other field.
    fn save_shortcuts(&self, shortcuts: &BTreeMap<String, String>) -> Result<()> {
        let mut settings = self.load()?;
        settings.shortcuts = shortcuts.clone();
        self.save(&settings)
    }
}

/// `settings.json` on disk.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/casecon/settings.json`, or `settings.json` in the working
    /// directory when no config directory is known.
    pub fn default_path() -> PathBuf {
        dirs_next::config_dir()
            .map(|dir| dir.join("casecon"))
            .unwrap_or_default()
            .join("settings.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, writing the defaults first when the file is missing
    /// so later runs see the same bindings.
    pub fn load_or_init(&self) -> Result<Settings> {
        if self.path.exists() {
            return self.load();
        }
        let settings = Settings::default();
        tracing::debug!(path = %self.path.display(), "writing default settings");
        self.save(&settings)?;
        Ok(settings)
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings> {
        Settings::load(&self.path).map_err(|e| CaseError::Settings(format!("{e:#}")))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .save(&self.path)
            .map_err(|e| CaseError::ConfigPersistFailed(format!("{e:#}")))
    }
}
