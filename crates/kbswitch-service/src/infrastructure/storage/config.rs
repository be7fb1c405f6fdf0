//! TOML-based configuration persistence for the switching service.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\KbSwitch\config.toml`
//! - Linux:    `~/.config/kbswitch/config.toml`
//! - macOS:    `~/Library/Application Support/KbSwitch/config.toml`
//!
//! Example:
//!
//! ```toml
//! [service]
//! log_level = "info"
//! indicator_enabled = false
//!
//! [switching]
//! mode = "per_application"
//! enabled_layouts = ["english", "french"]
//! last_layout = "french"
//!
//! [shortcuts]
//! cycle_layout = "ControlLeft,Space"
//! toggle_indicator = "ControlLeft,AltLeft,KeyI"
//! jump_to_layout = ["AltLeft,Digit1", "AltLeft,Digit2"]
//! ```
//!
//! Every field has a serde default, so the service works on first run (no
//! file) and with files written by older versions. `enabled_layouts` also
//! accepts the comma-separated text form, e.g. `"english,french"`.

use std::path::{Path, PathBuf};

use kbswitch_core::SwitchMode;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// File name of the config inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "KBSWITCH_CONFIG";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub switching: SwitchingConfig,
    #[serde(default)]
    pub shortcuts: ShortcutsConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// `tracing` log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether the toggle command may show the on-screen indicator.
    #[serde(default)]
    pub indicator_enabled: bool,
}

/// Layout selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwitchingConfig {
    #[serde(default)]
    pub mode: SwitchMode,
    /// Ordered layouts the user cycles through.
    #[serde(
        default = "default_enabled_layouts",
        deserialize_with = "deserialize_layout_list"
    )]
    pub enabled_layouts: Vec<String>,
    /// Layout that was current when the service last changed it.
    #[serde(default = "default_last_layout")]
    pub last_layout: String,
}

/// Descriptor strings for each shortcut slot. Empty means unbound.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortcutsConfig {
    #[serde(default = "default_cycle_shortcut")]
    pub cycle_layout: String,
    #[serde(default)]
    pub toggle_indicator: String,
    /// Jump slots; index 0 holds the descriptor for layout 1.
    #[serde(default)]
    pub jump_to_layout: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_enabled_layouts() -> Vec<String> {
    vec!["english".to_string()]
}
fn default_last_layout() -> String {
    "english".to_string()
}
fn default_cycle_shortcut() -> String {
    "ControlLeft,Space".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            indicator_enabled: false,
        }
    }
}

impl Default for SwitchingConfig {
    fn default() -> Self {
        Self {
            mode: SwitchMode::default(),
            enabled_layouts: default_enabled_layouts(),
            last_layout: default_last_layout(),
        }
    }
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            cycle_layout: default_cycle_shortcut(),
            toggle_indicator: String::new(),
            jump_to_layout: Vec::new(),
        }
    }
}

impl ShortcutsConfig {
    /// Descriptor for the 1-based jump slot `n`, empty when not configured.
    pub fn jump_descriptor(&self, n: usize) -> &str {
        n.checked_sub(1)
            .and_then(|i| self.jump_to_layout.get(i))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Stores the descriptor for the 1-based jump slot `n`, growing the list
    /// with unbound slots as needed.
    pub fn set_jump_descriptor(&mut self, n: usize, descriptor: &str) {
        let Some(index) = n.checked_sub(1) else {
            return;
        };
        if self.jump_to_layout.len() <= index {
            self.jump_to_layout.resize(index + 1, String::new());
        }
        self.jump_to_layout[index] = descriptor.to_string();
    }
}

// ── Enabled-layouts text form ─────────────────────────────────────────────────

/// Splits the comma-separated enabled-layouts text into layout names.
///
/// Entries are trimmed and empty entries dropped, so `""` yields no layouts.
pub fn parse_enabled_layouts(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LayoutList {
    List(Vec<String>),
    Text(String),
}

fn deserialize_layout_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LayoutList::deserialize(deserializer)? {
        LayoutList::List(list) => list,
        LayoutList::Text(text) => parse_enabled_layouts(&text),
    })
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Picks the config file: an explicit override wins, then the platform path.
pub fn resolve_config_path(override_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path(),
    }
}

/// Loads [`AppConfig`] from `path`, returning the defaults if the file does
/// not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(AppConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `KbSwitch`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KbSwitch"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kbswitch"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KbSwitch")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kbswitch_test_{}", Uuid::new_v4()))
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_has_english_only() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.switching.enabled_layouts, vec!["english".to_string()]);
        assert_eq!(cfg.switching.last_layout, "english");
        assert_eq!(cfg.switching.mode, SwitchMode::Global);
    }

    #[test]
    fn test_service_config_defaults() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.indicator_enabled);
    }

    #[test]
    fn test_shortcuts_default_binds_only_cycle() {
        let cfg = ShortcutsConfig::default();
        assert_eq!(cfg.cycle_layout, "ControlLeft,Space");
        assert!(cfg.toggle_indicator.is_empty());
        assert!(cfg.jump_to_layout.is_empty());
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_full_document() {
        // Arrange
        let toml_str = r#"
[service]
log_level = "debug"
indicator_enabled = true

[switching]
mode = "per_application"
enabled_layouts = ["english", "french"]
last_layout = "french"

[shortcuts]
cycle_layout = "AltLeft,ShiftLeft"
toggle_indicator = "ControlLeft,AltLeft,KeyI"
jump_to_layout = ["AltLeft,Digit1", ""]
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg.service.log_level, "debug");
        assert!(cfg.service.indicator_enabled);
        assert_eq!(cfg.switching.mode, SwitchMode::PerApplication);
        assert_eq!(cfg.switching.enabled_layouts, vec!["english", "french"]);
        assert_eq!(cfg.switching.last_layout, "french");
        assert_eq!(cfg.shortcuts.cycle_layout, "AltLeft,ShiftLeft");
        assert_eq!(cfg.shortcuts.jump_descriptor(1), "AltLeft,Digit1");
        assert_eq!(cfg.shortcuts.jump_descriptor(2), "");
    }

    #[test]
    fn test_enabled_layouts_accepts_comma_text() {
        let toml_str = r#"
[switching]
enabled_layouts = "english, french,,german"
"#;
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize");
        assert_eq!(
            cfg.switching.enabled_layouts,
            vec!["english", "french", "german"]
        );
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        let result: Result<AppConfig, _> = toml::from_str("[switching]\nmode = \"sometimes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_enabled_layouts_splits_on_commas() {
        assert_eq!(parse_enabled_layouts("english,french"), vec!["english", "french"]);
        assert_eq!(parse_enabled_layouts(" english "), vec!["english"]);
        assert!(parse_enabled_layouts("").is_empty());
        assert!(parse_enabled_layouts(",,").is_empty());
    }

    // ── Jump slots ────────────────────────────────────────────────────────────

    #[test]
    fn test_jump_descriptor_out_of_range_is_unbound() {
        let cfg = ShortcutsConfig::default();
        assert_eq!(cfg.jump_descriptor(0), "");
        assert_eq!(cfg.jump_descriptor(3), "");
    }

    #[test]
    fn test_set_jump_descriptor_grows_with_unbound_slots() {
        // Arrange
        let mut cfg = ShortcutsConfig::default();

        // Act
        cfg.set_jump_descriptor(3, "AltLeft,Digit3");

        // Assert
        assert_eq!(cfg.jump_to_layout, vec!["", "", "AltLeft,Digit3"]);
    }

    #[test]
    fn test_set_jump_descriptor_ignores_slot_zero() {
        let mut cfg = ShortcutsConfig::default();
        cfg.set_jump_descriptor(0, "AltLeft,Digit1");
        assert!(cfg.jump_to_layout.is_empty());
    }

    // ── File round trip ───────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = temp_dir().join(CONFIG_FILE_NAME);
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join(CONFIG_FILE_NAME);
        let mut cfg = AppConfig::default();
        cfg.switching.enabled_layouts = vec!["english".into(), "greek".into()];
        cfg.switching.last_layout = "greek".into();
        cfg.shortcuts.set_jump_descriptor(2, "AltLeft,Digit2");

        // Act
        save_config_to(&path, &cfg).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_malformed_file_is_parse_error() {
        // Arrange
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[[[ not valid toml").expect("write");

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── Path resolution ───────────────────────────────────────────────────────

    #[test]
    fn test_resolve_config_path_prefers_override() {
        let explicit = PathBuf::from("/tmp/elsewhere/kbswitch.toml");
        let resolved = resolve_config_path(Some(&explicit)).expect("override always resolves");
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        // NoPlatformConfigDir is acceptable in a stripped environment.
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME), "got {path:?}");
        }
    }
}
