//! Configuration file handling for the linker.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up by [`Config::find`].
pub const CONFIG_FILE_NAME: &str = "weave.toml";

/// Represents the weave.toml configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub linker: LinkerOptions,
}

/// Options of one linking pass, read from the `[linker]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerOptions {
    /// Inline call sites whose shape allows it. When false every aspect
    /// reference becomes an explicit call.
    pub inlining: bool,
    /// Run the structural cleanup passes after linking.
    pub cleanup: bool,
    /// Upper bound on cleanup iterations before giving up on a fixpoint.
    pub max_cleanup_iterations: usize,
}

impl Default for LinkerOptions {
    fn default() -> Self {
        Self {
            inlining: true,
            cleanup: true,
            max_cleanup_iterations: 10,
        }
    }
}

impl LinkerOptions {
    /// Options that keep every reference as an explicit call.
    #[must_use]
    pub fn without_inlining() -> Self {
        Self {
            inlining: false,
            ..Self::default()
        }
    }
}

impl Config {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid configuration.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).with_context(|| format!("Failed to parse {CONFIG_FILE_NAME}"))
    }

    /// Loads configuration from a weave.toml file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        Self::parse(&contents)
    }

    /// Saves configuration to a weave.toml file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize configuration")?;

        fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))
    }

    /// Finds the weave.toml file starting from the current directory.
    ///
    /// # Errors
    /// Returns an error if no weave.toml is found in the current or parent directories.
    pub fn find() -> Result<(Self, std::path::PathBuf)> {
        let current_dir =
            std::env::current_dir().with_context(|| "Failed to get current directory")?;
        Self::find_from(current_dir)
    }

    /// Finds the weave.toml file starting from `start` and walking up.
    ///
    /// # Errors
    /// Returns an error if no weave.toml is found in `start` or any parent directory.
    pub fn find_from(start: impl Into<std::path::PathBuf>) -> Result<(Self, std::path::PathBuf)> {
        let mut current_dir = start.into();

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::load(&config_path)?;
                return Ok((config, current_dir));
            }

            if !current_dir.pop() {
                anyhow::bail!(
                    "Could not find {CONFIG_FILE_NAME} in current directory or any parent directory"
                );
            }
        }
    }
}
