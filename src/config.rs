//! Stowage configuration.
//!
//! Loaded from `~/.stowage/config.toml` when present; a missing file means
//! defaults. The only setting is an alternate depot location.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Stowage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Path to the depot database. Defaults to `~/.stowage/depot.sqlite`.
    pub depot: Option<PathBuf>,
}

impl Config {
    /// Load config from `~/.stowage/config.toml`, or defaults if the file
    /// doesn't exist.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.stowage/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".stowage").join("config.toml"))
    }
}
