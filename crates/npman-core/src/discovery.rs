use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("plugin root does not exist: {0}")]
    MissingRoot(PathBuf),
    #[error("plugin root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to read plugin root: {0}")]
    Io(#[from] std::io::Error),
}

/// A plugin folder found directly under a plugin root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFolder {
    /// Folder name with any leading underscore stripped.
    pub name: String,
    pub path: PathBuf,
    /// Underscore-prefixed folders are implicitly disabled; no stored flag
    /// can re-enable them.
    pub underscore_disabled: bool,
}

/// Scan one level of `root` for plugin folders.
///
/// Files and dot-folders are skipped. Folders prefixed with `_` report the
/// stripped name and are marked underscore-disabled. Results are sorted
/// case-insensitively by name.
pub fn discover_folders(root: &Path) -> Result<Vec<PluginFolder>, DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            tracing::debug!("skipping non-UTF-8 folder name under {}", root.display());
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }
        let (name, underscore_disabled) = match file_name.strip_prefix('_') {
            Some(stripped) => (stripped.to_string(), true),
            None => (file_name.to_string(), false),
        };
        folders.push(PluginFolder {
            name,
            path,
            underscore_disabled,
        });
    }

    folders.sort_by_key(|folder| folder.name.to_lowercase());
    Ok(folders)
}
