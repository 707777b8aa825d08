use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use intentql::filters::NormalizeOptions;

pub const CONFIG_FILE_NAME: &str = "intentql.toml";

/// Configuration stored in intentql.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentqlConfig {
    #[serde(default)]
    pub normalizer: NormalizeOptions,
    #[serde(default)]
    pub compiler: CompilerSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerSettings {
    /// Prefix for `compile` output, producing a full request URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Run the normalizer before every compile.
    #[serde(default)]
    pub normalize: bool,
}

/// Loaded configuration plus where it came from.
pub struct ConfigContext {
    pub config: IntentqlConfig,
    /// `None` when running on built-in defaults.
    pub source: Option<PathBuf>,
}

impl ConfigContext {
    /// Load from `explicit` if given, otherwise search from the current directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let current_dir = std::env::current_dir().context("Failed to get current directory")?;
                Self::find_from(&current_dir)
            }
        }
    }

    /// Walk up from `start` looking for intentql.toml; fall back to defaults.
    pub fn find_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
            if !current.pop() {
                debug!("no {CONFIG_FILE_NAME} found above {}, using defaults", start.display());
                return Ok(Self {
                    config: IntentqlConfig::default(),
                    source: None,
                });
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config: IntentqlConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        config.normalizer.validate()?;
        debug!("loaded configuration from {}", path.display());
        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = IntentqlConfig::default();
        assert_eq!(config.normalizer.type_field, "type");
        assert!(config.normalizer.expand_dates);
        assert!(config.normalizer.type_codes.contains("partial_invoice"));
        assert_eq!(config.compiler.base_url, None);
        assert!(!config.compiler.normalize);
    }

    #[test]
    fn test_config_serialization() {
        let config = IntentqlConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("type_field"));
        assert!(toml_str.contains("type_codes"));
        assert!(!toml_str.contains("base_url"));

        let parsed: IntentqlConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[compiler]\nbase_url = \"https://api.test/orders\"\n").unwrap();

        let ctx = ConfigContext::from_file(&path).unwrap();
        assert_eq!(ctx.config.compiler.base_url.as_deref(), Some("https://api.test/orders"));
        assert_eq!(ctx.config.normalizer, NormalizeOptions::default());
        assert_eq!(ctx.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn finds_config_in_parent_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[normalizer]\ntype_field = \"kind\"\ntype_codes = [\"Alpha\"]\n",
        )
        .unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let ctx = ConfigContext::find_from(&nested).unwrap();
        assert_eq!(ctx.config.normalizer.type_field, "kind");
        assert!(ctx.config.normalizer.type_codes.contains("ALPHA"));
        assert!(ctx.config.normalizer.expand_dates);
    }

    #[test]
    fn rejects_empty_type_codes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[normalizer]\ntype_codes = []\n").unwrap();

        let err = ConfigContext::from_file(&path).err().unwrap();
        assert!(err.to_string().contains("type_codes"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[normalizer\n").unwrap();
        assert!(ConfigContext::from_file(&path).is_err());
    }
}
