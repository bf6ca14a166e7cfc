use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use npman_core::{
    build_state, default_user_config_path, ensure_user_config, load_plan, parse_major,
    ConfigStore, LoadStatus, PluginState,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "npman",
    version,
    about = "Plugin folder manager panel for the Nuke compositing host"
)]
struct Cli {
    /// Path to the configuration JSON file. Defaults to the user config
    /// beneath ~/.nuke, seeded from the studio baseline when missing.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show plugin folders under the active root with their effective state.
    List,
    /// Enable a plugin folder in the active root.
    Enable { name: String },
    /// Disable a plugin folder in the active root.
    Disable { name: String },
    /// Set the active plugin root.
    SetRoot { path: PathBuf },
    /// Set or clear the maximum supported host version for a folder.
    SetMax {
        name: String,
        /// Maximum host version, e.g. 14 or 14.0v5. Omit to clear.
        version: Option<String>,
    },
    /// Switch vanilla mode on or off. When on, no plugin folders are handed
    /// to the host at startup.
    Vanilla {
        #[arg(value_parser = parse_switch, action = clap::ArgAction::Set)]
        state: bool,
    },
    /// Print the startup load plan, one folder path per line.
    Paths {
        /// Host version used for gating, e.g. 15 or 15.1v2.
        #[arg(long, value_name = "VERSION")]
        host_version: Option<String>,
    },
    /// Create the user configuration, copying the studio baseline if one is
    /// available.
    Init,
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{other}'")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config_path = resolve_config_path(&cli)?;

    match cli.command {
        Commands::List => cmd_list(&config_path),
        Commands::Enable { name } => cmd_set_enabled(&config_path, &name, true),
        Commands::Disable { name } => cmd_set_enabled(&config_path, &name, false),
        Commands::SetRoot { path } => cmd_set_root(&config_path, path),
        Commands::SetMax { name, version } => cmd_set_max(&config_path, &name, version),
        Commands::Vanilla { state } => cmd_vanilla(&config_path, state),
        Commands::Paths { host_version } => cmd_paths(&config_path, host_version.as_deref()),
        Commands::Init => cmd_init(&config_path),
    }
}

/// An explicit --config is used as-is; the default user config is created
/// from the baseline on first use.
fn resolve_config_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.config {
        return Ok(path.clone());
    }
    let path = default_user_config_path().context("could not determine the home directory")?;
    ensure_user_config(&path).with_context(|| format!("failed to prepare {}", path.display()))?;
    Ok(path)
}

fn open_store(config_path: &Path) -> ConfigStore {
    let store = ConfigStore::open(config_path);
    if store.status() == LoadStatus::Invalid {
        eprintln!(
            "warning: {} was unreadable; starting from defaults (saving will replace it)",
            config_path.display()
        );
    }
    store
}

fn cmd_list(config_path: &Path) -> Result<()> {
    let store = open_store(config_path);
    let config = store.config();
    let state = build_state(&config);

    if state.plugins_root.as_os_str().is_empty() {
        println!("No plugin root configured. Use 'npman set-root <path>'.");
        return Ok(());
    }
    println!(
        "Root: {}{}",
        state.plugins_root.display(),
        if state.vanilla { " (vanilla mode)" } else { "" }
    );
    if state.plugins.is_empty() {
        println!("  no plugin folders found");
        return Ok(());
    }
    for plugin in &state.plugins {
        let mark = if plugin.enabled { "x" } else { " " };
        let mut notes = Vec::new();
        if plugin.underscore_disabled {
            notes.push("underscore-disabled".to_string());
        }
        if let Some(max_version) = &plugin.max_version {
            notes.push(format!("max {max_version}"));
        }
        let suffix = if notes.is_empty() {
            String::new()
        } else {
            format!(" ({})", notes.join(", "))
        };
        println!("  [{mark}] {}{suffix}", plugin.name);
    }
    Ok(())
}

fn require_folder(state: &PluginState, name: &str) -> Result<()> {
    if state.plugins_root.as_os_str().is_empty() {
        bail!("no plugin root configured; use 'npman set-root <path>' first");
    }
    if !state.plugins.iter().any(|plugin| plugin.name == name) {
        bail!(
            "no plugin folder named '{name}' under {}",
            state.plugins_root.display()
        );
    }
    Ok(())
}

fn cmd_set_enabled(config_path: &Path, name: &str, enabled: bool) -> Result<()> {
    let store = open_store(config_path);
    let state = build_state(&store.config());
    require_folder(&state, name)?;

    store.update(|config| config.set_enabled(name, enabled));
    store.save()?;

    let verb = if enabled { "Enabled" } else { "Disabled" };
    println!("{verb} {name}");
    if enabled
        && state
            .plugins
            .iter()
            .any(|plugin| plugin.name == name && plugin.underscore_disabled)
    {
        println!("note: the folder is underscore-prefixed and stays disabled until renamed");
    }
    Ok(())
}

fn cmd_set_root(config_path: &Path, path: PathBuf) -> Result<()> {
    if !path.is_dir() {
        eprintln!(
            "warning: {} is not a directory; no plugin folders will be listed",
            path.display()
        );
    }
    let store = open_store(config_path);
    store.update(|config| config.set_plugins_root(&path));
    store.save()?;
    println!("Active plugin root: {}", path.display());
    Ok(())
}

fn cmd_set_max(config_path: &Path, name: &str, version: Option<String>) -> Result<()> {
    if let Some(version) = version.as_deref() {
        if parse_major(version).is_none() {
            bail!("cannot parse a major version from '{version}'");
        }
    }
    let store = open_store(config_path);
    let state = build_state(&store.config());
    require_folder(&state, name)?;

    store.update(|config| config.set_max_version(name, version.clone()));
    store.save()?;

    match version {
        Some(version) => println!("{name}: max host version {version}"),
        None => println!("{name}: max host version cleared"),
    }
    Ok(())
}

fn cmd_vanilla(config_path: &Path, state: bool) -> Result<()> {
    let store = open_store(config_path);
    store.update(|config| config.set_vanilla(state));
    store.save()?;
    println!("Vanilla mode {}", if state { "on" } else { "off" });
    Ok(())
}

fn cmd_paths(config_path: &Path, host_version: Option<&str>) -> Result<()> {
    let host_major = match host_version {
        Some(version) => Some(
            parse_major(version)
                .with_context(|| format!("cannot parse a major version from '{version}'"))?,
        ),
        None => None,
    };
    let store = open_store(config_path);
    for item in load_plan(&store.config(), host_major) {
        println!("{}", item.path.display());
    }
    Ok(())
}

fn cmd_init(config_path: &Path) -> Result<()> {
    ensure_user_config(config_path)
        .with_context(|| format!("failed to prepare {}", config_path.display()))?;
    println!("Configuration ready at {}", config_path.display());
    Ok(())
}
