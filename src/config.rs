//! Configuration for the store location, the favorites key and named sources.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;

use crate::favorites::DEFAULT_FAVORITES_KEY;

/// One named remote list source.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
  pub url: String,
  /// Store key for the last-known-good snapshot of this source.
  pub storage_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Path of the sqlite store (defaults to the platform data dir).
  pub store_path: Option<PathBuf>,
  /// Store key for the favorites ledger.
  #[serde(default = "default_favorites_key")]
  pub favorites_key: String,
  /// Named sources, so the CLI can fetch by alias instead of a full URL.
  #[serde(default)]
  pub sources: BTreeMap<String, Source>,
}

fn default_favorites_key() -> String {
  DEFAULT_FAVORITES_KEY.to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      store_path: None,
      favorites_key: default_favorites_key(),
      sources: BTreeMap::new(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./offlist.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/offlist/config.yaml
  ///
  /// Defaults apply when no file exists anywhere.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("offlist.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("offlist").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}
