use std::path::PathBuf;

use crate::config::Config;
use crate::discovery::discover_folders;

/// Effective state of one plugin folder, discovery merged with stored
/// settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginStatus {
    pub name: String,
    pub path: PathBuf,
    pub underscore_disabled: bool,
    /// Stored flag (defaulting to true), forced off for underscore-disabled
    /// folders.
    pub enabled: bool,
    pub max_version: Option<String>,
}

/// Merged view the panel binds to: the active root's discovered folders with
/// their effective settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginState {
    pub vanilla: bool,
    pub plugins_root: PathBuf,
    pub plugins: Vec<PluginStatus>,
}

/// Build the merged state for the active root. An unset root or a failing
/// scan yields an empty plugin list rather than an error, so the panel always
/// has something to show.
pub fn build_state(config: &Config) -> PluginState {
    let mut state = PluginState {
        vanilla: config.vanilla,
        plugins_root: config.plugins_root.clone(),
        plugins: Vec::new(),
    };
    if config.plugins_root.as_os_str().is_empty() {
        return state;
    }

    let folders = match discover_folders(&config.plugins_root) {
        Ok(folders) => folders,
        Err(err) => {
            tracing::debug!("plugin discovery failed: {err}");
            return state;
        }
    };

    for folder in folders {
        let settings = config.plugin_settings(&folder.name);
        let stored_enabled = settings.map(|s| s.enabled).unwrap_or(true);
        state.plugins.push(PluginStatus {
            enabled: stored_enabled && !folder.underscore_disabled,
            max_version: settings.and_then(|s| s.max_version.clone()),
            name: folder.name,
            path: folder.path,
            underscore_disabled: folder.underscore_disabled,
        });
    }
    state
}
