use std::path::PathBuf;

use crate::config::Config;
use crate::state::build_state;

/// One plugin folder the host should add at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadItem {
    pub name: String,
    pub path: PathBuf,
}

/// Extract the leading major number from a host version string. Accepts forms
/// like `14`, `14.0` and `14.0v5`.
pub fn parse_major(version: &str) -> Option<u32> {
    let digits: &str = version
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or("");
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Compute the ordered list of plugin paths to hand to the host at startup.
///
/// Vanilla mode yields an empty plan. Underscore-disabled and disabled
/// folders are skipped. A folder with a parseable `max_version` is skipped
/// when the host major is unknown or exceeds the maximum; an unparseable
/// `max_version` does not gate.
pub fn load_plan(config: &Config, host_major: Option<u32>) -> Vec<LoadItem> {
    if config.vanilla {
        return Vec::new();
    }

    let state = build_state(config);
    let mut plan = Vec::new();
    for plugin in state.plugins {
        if plugin.underscore_disabled || !plugin.enabled {
            continue;
        }
        if let Some(max_major) = plugin.max_version.as_deref().and_then(parse_major) {
            match host_major {
                None => {
                    tracing::warn!("skipping {}: host version unknown", plugin.name);
                    continue;
                }
                Some(current) if current > max_major => {
                    tracing::debug!(
                        "skipping {}: host major {current} exceeds max {max_major}",
                        plugin.name
                    );
                    continue;
                }
                Some(_) => {}
            }
        }
        plan.push(LoadItem {
            name: plugin.name,
            path: plugin.path,
        });
    }
    plan
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn config_with_root(root: &std::path::Path, folders: &[&str]) -> Config {
        for folder in folders {
            create_dir_all(root.join(folder)).unwrap();
        }
        let mut config = Config::default();
        config.set_plugins_root(root);
        config
    }

    #[test]
    fn parse_major_accepts_host_version_forms() {
        assert_eq!(parse_major("14"), Some(14));
        assert_eq!(parse_major("14.0"), Some(14));
        assert_eq!(parse_major("15.1v3"), Some(15));
        assert_eq!(parse_major("v3"), None);
        assert_eq!(parse_major(""), None);
    }

    #[test]
    fn vanilla_mode_yields_empty_plan() {
        let dir = tempdir().unwrap();
        let mut config = config_with_root(dir.path(), &["Keyer"]);
        config.set_vanilla(true);
        assert!(load_plan(&config, Some(14)).is_empty());
    }

    #[test]
    fn disabled_and_underscore_folders_are_skipped() {
        let dir = tempdir().unwrap();
        let mut config = config_with_root(dir.path(), &["Keyer", "Roto", "_Retired"]);
        config.set_enabled("Roto", false);

        let plan = load_plan(&config, Some(14));
        let names: Vec<_> = plan.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Keyer"]);
    }

    #[test]
    fn version_gating_skips_too_new_hosts() {
        let dir = tempdir().unwrap();
        let mut config = config_with_root(dir.path(), &["Keyer", "Roto"]);
        config.set_max_version("Keyer", Some("13".into()));

        let plan = load_plan(&config, Some(14));
        let names: Vec<_> = plan.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Roto"]);

        let plan = load_plan(&config, Some(13));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn unknown_host_version_skips_gated_folders_only() {
        let dir = tempdir().unwrap();
        let mut config = config_with_root(dir.path(), &["Keyer", "Roto"]);
        config.set_max_version("Keyer", Some("14.0v5".into()));

        let plan = load_plan(&config, None);
        let names: Vec<_> = plan.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Roto"]);
    }

    #[test]
    fn unparseable_max_version_does_not_gate() {
        let dir = tempdir().unwrap();
        let mut config = config_with_root(dir.path(), &["Keyer"]);
        config.set_max_version("Keyer", Some("latest".into()));

        let plan = load_plan(&config, None);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn plan_paths_point_at_the_folders() {
        let dir = tempdir().unwrap();
        let config = config_with_root(dir.path(), &["Keyer"]);
        let plan = load_plan(&config, Some(14));
        assert_eq!(plan[0].path, dir.path().join("Keyer"));
    }
}
