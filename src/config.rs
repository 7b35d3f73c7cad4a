use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{CVD_EXTENSION, DEFAULT_OUTPUT_SUFFIX};
use crate::document::{DEFAULT_DOCUMENT_PATH, DenyList};
use crate::pipeline::PipelineOptions;

/// User configuration for cvdprune
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Element names stripped from the document
    pub deny_list: DenyList,

    /// Document to prune, relative to the archive root
    pub document_path: String,

    /// Appended to the source file stem to name the output
    pub output_suffix: String,

    /// Extension of the output archive, without the dot
    pub output_extension: String,

    /// Parent of the per-run scratch directory; system temp dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            deny_list: DenyList::default(),
            document_path: DEFAULT_DOCUMENT_PATH.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            output_extension: CVD_EXTENSION.to_string(),
            scratch_root: None,
        }
    }
}

impl Config {
    /// Load config from the user config directory
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        // Return defaults if no config found
        Ok(Config::default())
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the user config directory, returning where it was written
    pub fn save(&self) -> Result<Option<PathBuf>> {
        match Self::get_config_path() {
            Some(config_path) => {
                self.save_to(&config_path)?;
                Ok(Some(config_path))
            }
            None => Ok(None),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cvdprune").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<Option<PathBuf>> {
        Config::default().save()
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            deny_list: self.deny_list.clone(),
            document_path: PathBuf::from(&self.document_path),
            output_suffix: self.output_suffix.clone(),
            output_extension: self.output_extension.clone(),
            scratch_root: self.scratch_root.clone(),
            output: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_builtin_values() {
        let config = Config::default();
        assert_eq!(config.deny_list.tags().len(), 6);
        assert_eq!(config.document_path, "doc/equips.xml");
        assert_eq!(config.output_suffix, "_set");
        assert_eq!(config.output_extension, "cvd");
        assert!(config.scratch_root.is_none());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str("deny_list = [\"asset\", \"name\"]\n").unwrap();

        assert_eq!(config.deny_list.tags(), ["asset", "name"]);
        assert_eq!(config.document_path, DEFAULT_DOCUMENT_PATH);
        assert_eq!(config.output_suffix, DEFAULT_OUTPUT_SUFFIX);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let config = Config {
            output_suffix: "_clean".to_string(),
            scratch_root: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_names_path_in_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "deny_list = 7").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err}").contains("config.toml"));
    }

    #[test]
    fn test_pipeline_options_carry_config() {
        let config = Config {
            document_path: "data/items.xml".to_string(),
            ..Config::default()
        };
        let options = config.pipeline_options();

        assert_eq!(options.document_path, PathBuf::from("data/items.xml"));
        assert_eq!(options.deny_list, config.deny_list);
        assert!(options.output.is_none());
    }
}
