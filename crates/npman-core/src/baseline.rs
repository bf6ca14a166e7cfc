use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::store_json::{save_config, StoreError};

/// Points at a studio-wide baseline configuration to seed new user configs.
pub const BASELINE_ENV_VAR: &str = "NPMAN_BASELINE";

/// File name of the exe-adjacent fallback baseline.
pub const BASELINE_FILE_NAME: &str = "default_config.json";

/// Default user configuration path beneath the host's user directory:
/// `~/.nuke/npman/plugin_manager.json`.
pub fn default_user_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".nuke").join("npman").join("plugin_manager.json"))
}

/// Locate the baseline configuration, if any. The environment variable wins
/// over the `default_config.json` shipped next to the executable.
pub fn resolve_baseline_path() -> Option<PathBuf> {
    let env_value = env::var_os(BASELINE_ENV_VAR);
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_baseline_from(env_value.as_deref(), exe_dir.as_deref())
}

fn resolve_baseline_from(
    env_value: Option<&std::ffi::OsStr>,
    exe_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(value) = env_value {
        if !value.is_empty() {
            let candidate = PathBuf::from(value);
            if candidate.is_file() {
                return Some(candidate);
            }
            tracing::warn!(
                "{BASELINE_ENV_VAR} points at {} which is not a file",
                candidate.display()
            );
        }
    }
    let candidate = exe_dir?.join(BASELINE_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Make sure a user configuration exists at `path`. A missing config is seeded
/// from the baseline when one resolves, otherwise from the built-in defaults.
/// Existing configs are never touched.
pub fn ensure_user_config(path: &Path) -> Result<(), StoreError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if let Some(baseline) = resolve_baseline_path() {
        match fs::copy(&baseline, path) {
            Ok(_) => {
                tracing::info!(
                    "seeded {} from baseline {}",
                    path.display(),
                    baseline.display()
                );
                return Ok(());
            }
            Err(err) => {
                tracing::warn!("failed to copy baseline {}: {err}", baseline.display());
            }
        }
    }
    save_config(path, &Config::default())
}
