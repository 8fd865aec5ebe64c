//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Application directory name under the config root.
const APP_DIR: &str = "movies";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// Lookup order:
/// 1. `{dir}/config.toml` when `--dir` is given.
/// 2. `$XDG_CONFIG_HOME/movies/config.toml` when the variable is set and non-empty.
/// 3. `~/.config/movies/config.toml`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable
/// (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    let xdg = std::env::var("XDG_CONFIG_HOME").ok();
    let home = std::env::var("HOME").ok();
    config_path_from_env(xdg.as_deref(), home.as_deref())
}

/// Picks the config path from the environment values.
fn config_path_from_env(xdg_config_home: Option<&str>, home: Option<&str>) -> Result<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|v| !v.is_empty()) {
        return Ok(Path::new(xdg).join(APP_DIR).join(CONFIG_FILE));
    }

    let home = home.context("HOME environment variable is not set")?;
    Ok(Path::new(home)
        .join(".config")
        .join(APP_DIR)
        .join(CONFIG_FILE))
}
