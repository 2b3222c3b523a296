//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/leaftree/leaftree.toml`
//! 3. Local config: `<document_dir>/.leaftree.toml` (next to the forest document)
//! 4. Environment variables: `LEAFTREE_*` prefix

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// How `show` prints a forest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented tree
    #[default]
    Tree,
    /// Normalized forest document
    Toml,
}

impl OutputFormat {
    fn parse(value: &str) -> Result<Self, ApplicationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "toml" => Ok(Self::Toml),
            other => Err(ApplicationError::Config {
                message: format!("unsupported format `{other}`; expected tree|toml"),
            }),
        }
    }
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<OutputFormat>,
    pub show_positions: Option<bool>,
}

/// Unified configuration for leaftree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Output format of `show` (default: tree)
    pub format: OutputFormat,
    /// Print sibling positions next to leaf names (default: true)
    pub show_positions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Tree,
            show_positions: true,
        }
    }
}

/// Get the XDG config directory for leaftree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "leaftree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("leaftree.toml"))
}

/// Get the path to the local config file in a document directory.
pub fn local_config_path(document_dir: &Path) -> PathBuf {
    document_dir.join(".leaftree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            show_positions: overlay.show_positions.unwrap_or(self.show_positions),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `document_dir` - Optional directory of the forest document for local config
    pub fn load(document_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config next to the document
        if let Some(dir) = document_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply LEAFTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("LEAFTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("format") {
            settings.format = OutputFormat::parse(&val)?;
        }
        if let Ok(val) = config.get_bool("show_positions") {
            settings.show_positions = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# leaftree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/leaftree/leaftree.toml
#   Local:  <document_dir>/.leaftree.toml
#   Env:    LEAFTREE_* environment variables

# Output format of `leaftree show`: "tree" or "toml"
# format = "tree"

# Print sibling positions next to leaf names
# show_positions = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_tree_with_positions() {
        let settings = Settings::default();
        assert_eq!(settings.format, OutputFormat::Tree);
        assert!(settings.show_positions);
    }

    #[test]
    fn test_merge_with_overlay_wins() {
        let overlay = RawSettings {
            format: Some(OutputFormat::Toml),
            show_positions: None,
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.format, OutputFormat::Toml);
        assert!(merged.show_positions);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse(" TOML ").unwrap(), OutputFormat::Toml);
        assert!(OutputFormat::parse("yaml").is_err());
    }

    #[test]
    fn test_template_parses_as_empty_settings() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.format.is_none());
        assert!(raw.show_positions.is_none());
    }

    #[test]
    fn test_to_toml_roundtrips() {
        let settings = Settings {
            format: OutputFormat::Toml,
            show_positions: false,
        };
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
