//! Key/value configuration store shared by the host and its plugins
//!
//! Settings are namespaced by group (one group per plugin) and persisted as
//! pretty-printed JSON in `config.json` under the platform config directory.
//! Plugins declare their persisted settings as a [`ConfigGroup`] so the host
//! settings UI can render labels and keep internal items hidden.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directory under the platform config dir holding the config file
pub const APP_DIR_NAME: &str = "autoparty";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.json";

// =============================================================================
// Settings Schema
// =============================================================================

/// A single persisted setting declared by a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigItem {
    /// Stable key within the group
    pub key: &'static str,

    /// Human-readable label for the settings UI
    pub label: &'static str,

    /// Longer description shown alongside the label
    pub description: &'static str,

    /// Hidden items are internal storage and never rendered
    pub hidden: bool,
}

/// The settings a plugin persists under one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigGroup {
    /// Group name, unique per plugin
    pub group: &'static str,

    /// Declared items
    pub items: &'static [ConfigItem],
}

impl ConfigGroup {
    /// Items the settings UI should render
    pub fn visible_items(&self) -> impl Iterator<Item = &ConfigItem> {
        self.items.iter().filter(|item| !item.hidden)
    }

    /// Look up a declared item by key
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&ConfigItem> {
        self.items.iter().find(|item| item.key == key)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors from loading or saving the config file
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading/writing the file
    Io(io::Error),
    /// File contents are not valid JSON of the expected shape
    InvalidFormat,
    /// Serialization failed
    SerializationFailed,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::InvalidFormat => write!(f, "invalid config file format"),
            ConfigError::SerializationFailed => write!(f, "serialization failed"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

// =============================================================================
// Config Store
// =============================================================================

/// Persistent config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    /// Flat `group.key -> value` map, kept sorted for stable files
    settings: BTreeMap<String, String>,
}

/// File-backed key/value configuration store
///
/// Values are plain strings; boolean settings are stored as `"true"`/`"false"`
/// and anything absent or unparsable reads as false. Writes are buffered in
/// memory until [`ConfigStore::save`], which is skipped when nothing changed.
#[derive(Debug)]
pub struct ConfigStore {
    /// Backing file, `None` for an in-memory store
    path: Option<PathBuf>,

    /// All settings, keyed `group.key`
    settings: BTreeMap<String, String>,

    /// Whether there are unsaved changes
    dirty: bool,
}

impl ConfigStore {
    /// Create an empty store with no backing file
    ///
    /// [`ConfigStore::save`] is a no-op for in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            settings: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Get the platform-specific config file path
    ///
    /// Returns None if the config directory cannot be determined.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Open the store at an explicit path
    ///
    /// A missing file yields an empty store bound to that path. An existing
    /// file that is not valid JSON of the expected shape is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        if !path.exists() {
            return Ok(Self {
                path: Some(path),
                settings: BTreeMap::new(),
                dirty: false,
            });
        }

        let contents = fs::read_to_string(&path)?;
        let file: ConfigFile =
            serde_json::from_str(&contents).map_err(|_| ConfigError::InvalidFormat)?;

        Ok(Self {
            path: Some(path),
            settings: file.settings,
            dirty: false,
        })
    }

    /// Load from the default config path, or return an empty store
    ///
    /// Falls back to an in-memory store if the config directory cannot be
    /// determined, and to an empty store bound to the default path if the
    /// file cannot be read or parsed.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::in_memory();
        };

        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("failed to load {}: {}", path.display(), e);
                Self {
                    path: Some(path),
                    settings: BTreeMap::new(),
                    dirty: false,
                }
            }
        }
    }

    /// Save the store to its backing file
    ///
    /// Creates the parent directory if needed. Skipped when there are no
    /// unsaved changes or the store is in-memory.
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }

        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = ConfigFile {
            settings: self.settings.clone(),
        };
        let json =
            serde_json::to_string_pretty(&file).map_err(|_| ConfigError::SerializationFailed)?;
        fs::write(path, json)?;

        self.dirty = false;
        Ok(())
    }

    /// Full storage key for a group/key pair
    fn full_key(group: &str, key: &str) -> String {
        format!("{}.{}", group, key)
    }

    /// Get a setting, if present
    #[must_use]
    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.settings
            .get(&Self::full_key(group, key))
            .map(String::as_str)
    }

    /// Get a boolean setting
    ///
    /// Absent or unparsable values read as false.
    #[must_use]
    pub fn get_bool(&self, group: &str, key: &str) -> bool {
        self.get(group, key) == Some("true")
    }

    /// Set a setting, marking the store dirty only on an actual change
    pub fn set(&mut self, group: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        let full_key = Self::full_key(group, key);

        if self.settings.get(&full_key) == Some(&value) {
            return;
        }

        self.settings.insert(full_key, value);
        self.dirty = true;
    }

    /// Set a boolean setting
    pub fn set_bool(&mut self, group: &str, key: &str, value: bool) {
        self.set(group, key, if value { "true" } else { "false" });
    }

    /// Check if there are unsaved changes
    #[cfg(test)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

// =============================================================================
// Tests
// =============================================================================
