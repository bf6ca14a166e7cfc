use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Current configuration schema version. Version 2 scopes plugin state per
/// plugin-root path; version 1 carried a single flat plugin map.
pub const SCHEMA_VERSION: u32 = 2;

/// Stored settings for one plugin folder within a root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum supported host version, e.g. "14" or "14.0v5". Gating compares
    /// the leading major number only.
    #[serde(default)]
    pub max_version: Option<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_version: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Per-root plugin state. Keys are plugin folder names without the underscore
/// prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootConfig {
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginSettings>,
}

/// The panel configuration, schema v2.
///
/// `roots` keys are normalized absolute root paths, so the same folder name
/// under two different roots keeps independent state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// When set, no plugin folders are handed to the host at startup.
    #[serde(default)]
    pub vanilla: bool,
    /// The active plugin root the panel operates on.
    #[serde(default)]
    pub plugins_root: PathBuf,
    #[serde(default)]
    pub roots: BTreeMap<String, RootConfig>,
    // v1 flat plugin map, read only so migration can pick it up.
    #[serde(default, rename = "plugins", skip_serializing)]
    legacy_plugins: BTreeMap<String, PluginSettings>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            vanilla: false,
            plugins_root: PathBuf::new(),
            roots: BTreeMap::new(),
            legacy_plugins: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Upgrade to the current schema. A v1 flat plugin map moves under
    /// `roots[plugins_root]`; every flag is preserved. Idempotent.
    pub fn migrated(mut self) -> Self {
        if self.schema_version == 1 && !self.legacy_plugins.is_empty() {
            let plugins = std::mem::take(&mut self.legacy_plugins);
            if let Some(key) = normalize_root_key(&self.plugins_root) {
                self.roots.entry(key).or_default().plugins.extend(plugins);
            }
        }
        self.legacy_plugins.clear();
        self.schema_version = SCHEMA_VERSION;
        self
    }

    /// Stored state for the active root, if any has been recorded.
    pub fn active_root(&self) -> Option<&RootConfig> {
        let key = normalize_root_key(&self.plugins_root)?;
        self.roots.get(&key)
    }

    fn active_root_mut(&mut self) -> Option<&mut RootConfig> {
        let key = normalize_root_key(&self.plugins_root)?;
        Some(self.roots.entry(key).or_default())
    }

    /// Stored settings for a folder under the active root.
    pub fn plugin_settings(&self, name: &str) -> Option<&PluginSettings> {
        self.active_root().and_then(|root| root.plugins.get(name))
    }

    /// Record the enabled flag for a folder under the active root. A no-op
    /// when no root is set.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        if let Some(root) = self.active_root_mut() {
            root.plugins.entry(name.to_string()).or_default().enabled = enabled;
        }
    }

    /// Record or clear the maximum supported host version for a folder under
    /// the active root. A no-op when no root is set.
    pub fn set_max_version(&mut self, name: &str, max_version: Option<String>) {
        if let Some(root) = self.active_root_mut() {
            root.plugins.entry(name.to_string()).or_default().max_version = max_version;
        }
    }

    /// Set the active plugin root. The path is normalized once here so the
    /// `roots` key stays stable even if the directory (or a symlink to it)
    /// vanishes later.
    pub fn set_plugins_root(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        self.plugins_root = match normalize_root_key(&root) {
            Some(key) => PathBuf::from(key),
            None => root,
        };
    }

    pub fn set_vanilla(&mut self, vanilla: bool) {
        self.vanilla = vanilla;
    }
}

/// Normalize a plugin-root path into the key used by `Config::roots`.
///
/// Resolves symlinks when the path exists, otherwise falls back to making the
/// path absolute. Returns `None` for an unset root.
pub fn normalize_root_key(root: &Path) -> Option<String> {
    if root.as_os_str().is_empty() {
        return None;
    }
    let resolved = root.canonicalize().unwrap_or_else(|_| {
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            env::current_dir()
                .map(|cwd| cwd.join(root))
                .unwrap_or_else(|_| root.to_path_buf())
        }
    });
    Some(resolved.to_string_lossy().into_owned())
}
