// Settings resolution
//
// Resolves a ConnectionConfig from ~/.surq/config.toml on every call.
// A missing, unreadable, or malformed file resolves to the hardcoded
// defaults; resolution itself never fails.

use std::fs;
use std::path::{Path, PathBuf};

use super::settings::ConnectionConfig;

/// Produces a fresh ConnectionConfig for each operation.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    path: PathBuf,
}

impl ConfigResolver {
    /// Resolver reading the default settings path, ~/.surq/config.toml.
    pub fn new() -> Self {
        let path = dirs::home_dir()
            .map(|home| home.join(".surq").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".surq/config.toml"));

        Self { path }
    }

    /// Resolver reading settings from a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The settings path this resolver reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file and produce a config snapshot.
    ///
    /// Two-branch resolution: a well-formed file wins, anything else falls
    /// back to the defaults. Missing fields in a well-formed file fill in
    /// field by field.
    pub fn resolve(&self) -> ConnectionConfig {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "settings file not readable, using defaults"
                );
                return ConnectionConfig::default();
            }
        };

        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "settings file malformed, using defaults"
                );
                ConnectionConfig::default()
            }
        }
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}
