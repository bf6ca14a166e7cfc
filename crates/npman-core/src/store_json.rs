use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write configuration: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to replace configuration file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Outcome of a lenient configuration load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Ok,
    Missing,
    Invalid,
}

/// JSON-backed configuration store.
///
/// Opening is lenient and never fails: a missing or unreadable file yields the
/// built-in defaults, with [`LoadStatus`] telling the caller which happened so
/// the panel can prompt the user to reconfigure.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    status: LoadStatus,
    data: Mutex<Config>,
}

impl ConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (data, status) = load_config(&path);
        Self {
            path,
            status,
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Snapshot of the in-memory configuration.
    pub fn config(&self) -> Config {
        self.data.lock().clone()
    }

    /// Apply a mutation to the in-memory configuration. Nothing is written
    /// until [`ConfigStore::save`].
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut data = self.data.lock();
        mutate(&mut data);
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let data = self.data.lock();
        save_config(&self.path, &data)
    }
}

/// Load a configuration leniently. Missing files, directories, malformed JSON
/// and non-object documents all fall back to the defaults.
pub fn load_config(path: &Path) -> (Config, LoadStatus) {
    if !path.is_file() {
        return (Config::default(), LoadStatus::Missing);
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!("failed to read {}: {err}", path.display());
            return (Config::default(), LoadStatus::Invalid);
        }
    };
    match serde_json::from_str::<Config>(&raw) {
        Ok(config) => (config.migrated(), LoadStatus::Ok),
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}", path.display());
            (Config::default(), LoadStatus::Invalid)
        }
    }
}

/// Save a configuration atomically: serialize to a temp file in the target
/// directory, then rename over the destination. The parent directory is
/// created if needed, and the stored document is always schema v2.
pub fn save_config(path: &Path, config: &Config) -> Result<(), StoreError> {
    let out = config.clone().migrated();
    let json = serde_json::to_string_pretty(&out)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            parent
        }
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let (config, status) = load_config(&dir.path().join("nope.json"));
        assert_eq!(config, Config::default());
        assert_eq!(status, LoadStatus::Missing);
    }

    #[test]
    fn directory_path_loads_defaults() {
        let dir = tempdir().unwrap();
        let (config, status) = load_config(dir.path());
        assert_eq!(config, Config::default());
        assert_eq!(status, LoadStatus::Missing);
    }

    #[test]
    fn malformed_json_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        let (config, status) = load_config(&path);
        assert_eq!(config, Config::default());
        assert_eq!(status, LoadStatus::Invalid);
    }

    #[test]
    fn non_object_document_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let (config, status) = load_config(&path);
        assert_eq!(config, Config::default());
        assert_eq!(status, LoadStatus::Invalid);
    }

    #[test]
    fn save_load_roundtrip_preserves_flags_and_versions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.set_plugins_root("/studio/plugins");
        config.set_enabled("Keyer", false);
        config.set_enabled("Roto", true);
        config.set_max_version("Roto", Some("14.0v5".into()));
        config.set_vanilla(true);

        save_config(&path, &config).unwrap();
        let (loaded, status) = load_config(&path);
        assert_eq!(status, LoadStatus::Ok);
        assert_eq!(loaded, config);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep/nested/config.json");
        save_config(&path, &Config::default()).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn v1_file_loads_and_saves_as_v2() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let v1 = serde_json::json!({
            "schema_version": 1,
            "vanilla": false,
            "plugins_root": "/studio/plugins",
            "plugins": { "Keyer": { "enabled": false } }
        });
        fs::write(&path, serde_json::to_string(&v1).unwrap()).unwrap();

        let (loaded, status) = load_config(&path);
        assert_eq!(status, LoadStatus::Ok);
        assert_eq!(loaded.schema_version, crate::SCHEMA_VERSION);
        assert!(!loaded.roots["/studio/plugins"].plugins["Keyer"].enabled);

        save_config(&path, &loaded).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], 2);
        assert!(raw.get("plugins").is_none());
    }

    #[test]
    fn store_updates_are_visible_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::open(&path);
        assert_eq!(store.status(), LoadStatus::Missing);
        store.update(|config| {
            config.set_plugins_root("/studio/plugins");
            config.set_enabled("Keyer", false);
        });
        store.save().unwrap();

        let reopened = ConfigStore::open(&path);
        assert_eq!(reopened.status(), LoadStatus::Ok);
        assert_eq!(reopened.config(), store.config());
    }
}
