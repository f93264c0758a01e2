//! Configuration.
//!
//! Configuration is JSON. Every field has a default, so a file only needs
//! the values it overrides. Layers are merged in order: built-in defaults,
//! the user config file, then a file given with `--config`. Objects merge
//! key by key, `keybindings` and `commands` accumulate across layers, any
//! other value is replaced.

use crate::input::buffer::DEFAULT_MAX_REMAP_DEPTH;
use crate::view::{Orientation, ViewId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arrays that accumulate across layers instead of being replaced
const ACCUMULATING_KEYS: &[&str] = &["keybindings", "commands"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    /// Tabs opened at startup
    #[serde(default = "default_tabs")]
    pub tabs: Vec<TabConfig>,

    /// Extra key bindings, applied on top of the default key map
    #[serde(default)]
    pub keybindings: Vec<KeyBindingConfig>,

    /// Command lines run at startup, as if typed at the `:` prompt
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            input: InputConfig::default(),
            watch: WatchConfig::default(),
            tabs: default_tabs(),
            keybindings: Vec::new(),
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Minimum interval between two render passes
    #[serde(default = "default_render_debounce_ms")]
    pub debounce_ms: u64,

    /// Errors arriving within this window are shown together
    #[serde(default = "default_error_batch_ms")]
    pub error_batch_ms: u64,

    /// How long errors stay on screen at least
    #[serde(default = "default_min_error_display_ms")]
    pub min_error_display_ms: u64,
}

fn default_render_debounce_ms() -> u64 {
    16
}

fn default_error_batch_ms() -> u64 {
    100
}

fn default_min_error_display_ms() -> u64 {
    3000
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_render_debounce_ms(),
            error_batch_ms: default_error_batch_ms(),
            min_error_display_ms: default_min_error_display_ms(),
        }
    }
}

impl RenderConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn error_batch(&self) -> Duration {
        Duration::from_millis(self.error_batch_ms)
    }

    pub fn min_error_display(&self) -> Duration {
        Duration::from_millis(self.min_error_display_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Key tokens buffered between the input and handler loops. Keys typed
    /// while the buffer is full are dropped.
    #[serde(default = "default_key_channel_capacity")]
    pub key_channel_capacity: usize,

    /// Maximum remap expansions while resolving one key sequence
    #[serde(default = "default_max_remap_depth")]
    pub max_remap_depth: usize,

    #[serde(default = "default_true")]
    pub mouse: bool,
}

fn default_key_channel_capacity() -> usize {
    256
}

fn default_max_remap_depth() -> usize {
    DEFAULT_MAX_REMAP_DEPTH
}

fn default_true() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            key_channel_capacity: default_key_channel_capacity(),
            max_remap_depth: default_max_remap_depth(),
            mouse: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Quiet period before a batch of file changes is acted upon
    #[serde(default = "default_watch_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_watch_debounce_ms() -> u64 {
    500
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_watch_debounce_ms(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// A tab opened at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabConfig {
    pub name: String,

    /// `vertical`, `horizontal` or `dynamic`
    #[serde(default = "default_orientation")]
    pub orientation: String,

    /// View names, e.g. `RefView`
    #[serde(default)]
    pub views: Vec<String>,
}

fn default_orientation() -> String {
    Orientation::Dynamic.name().to_string()
}

fn default_tabs() -> Vec<TabConfig> {
    vec![TabConfig {
        name: "Main".to_string(),
        orientation: default_orientation(),
        views: vec![ViewId::Refs.name().to_string(), ViewId::Files.name().to_string()],
    }]
}

/// One key binding entry.
///
/// With `action` the keys run that action, with `remap` they expand to
/// other keys, with neither an existing binding is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindingConfig {
    /// Scope, e.g. `All` or `RefView`
    #[serde(default = "default_scope")]
    pub view: String,

    pub keys: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remap: Option<String>,
}

fn default_scope() -> String {
    ViewId::All.name().to_string()
}

impl Config {
    /// The config filename used throughout the application
    pub const FILENAME: &'static str = "config.json";

    /// Merge every layer over the defaults and validate the result.
    pub fn load(dirs: &DirectoryContext, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = serde_json::to_value(Config::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        let user = dirs.config_path();
        if user.exists() {
            tracing::info!("Loading config from {}", user.display());
            merge_layer(&mut merged, read_layer(&user)?);
        }
        if let Some(path) = explicit {
            tracing::info!("Loading config from {}", path.display());
            merge_layer(&mut merged, read_layer(path)?);
        }

        let config: Config =
            serde_json::from_value(merged).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single file over the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.key_channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "key_channel_capacity must be greater than 0".to_string(),
            ));
        }
        if self.input.max_remap_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_remap_depth must be greater than 0".to_string(),
            ));
        }
        if self.tabs.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one tab must be configured".to_string(),
            ));
        }
        for tab in &self.tabs {
            if tab.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "tab names must not be empty".to_string(),
                ));
            }
            if Orientation::from_name(&tab.orientation).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "tab {}: unknown orientation {}",
                    tab.name, tab.orientation
                )));
            }
            for view in &tab.views {
                if !ViewId::from_name(view).is_some_and(ViewId::is_creatable) {
                    return Err(ConfigError::ValidationError(format!(
                        "tab {}: {} cannot be opened in a tab",
                        tab.name, view
                    )));
                }
            }
        }
        Ok(())
    }
}

fn read_layer(path: &Path) -> Result<Value, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Merge `overlay` into `base`.
fn merge_layer(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(Value::Array(existing)) if ACCUMULATING_KEYS.contains(&key.as_str()) => {
                        if let Value::Array(more) = value {
                            existing.extend(more);
                        } else {
                            base_map.insert(key, value);
                        }
                    }
                    Some(existing) => merge_layer(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Directory paths for persistent state and configuration
///
/// Only `main` should build this from the system directories; everything
/// else receives it, so tests can point it at a temp directory.
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// Persistent state such as prompt histories
    /// e.g., ~/.local/share/repodash on Linux
    pub data_dir: PathBuf,

    /// User configuration
    /// e.g., ~/.config/repodash on Linux
    pub config_dir: PathBuf,
}

impl DirectoryContext {
    pub fn from_system() -> std::io::Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine data directory",
                )
            })?
            .join("repodash");
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config directory",
                )
            })?
            .join("repodash");
        Ok(Self {
            data_dir,
            config_dir,
        })
    }

    pub fn for_testing(temp_dir: &Path) -> Self {
        Self {
            data_dir: temp_dir.join("data"),
            config_dir: temp_dir.join("config"),
        }
    }

    /// Where prompt histories are stored
    pub fn prompt_history_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(Config::FILENAME)
    }
}
