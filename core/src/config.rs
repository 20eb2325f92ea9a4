/// Run configuration for the patcher
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::formats::{KeyOrder, SerializeOptions};
use crate::patcher::{PatchOptions, UnmappedPolicy};
use crate::scanner::ScanConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unsupported config file extension: {0}")]
    UnsupportedExtension(String),
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatcherConfig {
    /// Locale directory; the command line may override it
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Locale whose entry is used for codes without their own entry
    #[serde(default = "default_locale")]
    pub default_locale: String,

    #[serde(flatten)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub key_order: KeyOrder,

    #[serde(default = "default_true")]
    pub trailing_newline: bool,

    /// Keep a timestamped copy of every file before it is replaced
    #[serde(default)]
    pub backup: bool,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub unmapped: UnmappedPolicy,

    /// Abort the run when a translation drops or adds a placeholder
    #[serde(default)]
    pub strict_placeholders: bool,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            directory: None,
            default_locale: default_locale(),
            scan: ScanConfig::default(),
            key_order: KeyOrder::default(),
            trailing_newline: true,
            backup: false,
            dry_run: false,
            unmapped: UnmappedPolicy::default(),
            strict_placeholders: false,
        }
    }
}

impl PatcherConfig {
    /// Load configuration from a YAML or JSON file, chosen by extension.
    ///
    /// A relative `directory` is taken relative to the config file's folder.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            Some("json") => Self::from_json(&content)?,
            other => {
                return Err(ConfigError::UnsupportedExtension(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };

        if let (Some(directory), Some(parent)) = (&config.directory, path.parent()) {
            if directory.is_relative() {
                config.directory = Some(parent.join(directory));
            }
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_patch_options(&self) -> PatchOptions {
        PatchOptions {
            default_locale: self.default_locale.clone(),
            scan: self.scan.clone(),
            serialize: SerializeOptions {
                key_order: self.key_order,
                trailing_newline: self.trailing_newline,
            },
            unmapped: self.unmapped,
            backup: self.backup,
            dry_run: self.dry_run,
            strict_placeholders: self.strict_placeholders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PatcherConfig::default();
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.scan.excluded_files, vec!["contents.json".to_string()]);
        assert_eq!(config.key_order, KeyOrder::Sorted);
        assert!(config.trailing_newline);
        assert!(!config.backup);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = PatcherConfig::from_yaml(
            r#"
directory: eater/Localization
excludedFiles: [Contents.json, base.json]
unmapped: skip
keyOrder: preserve
"#,
        )
        .unwrap();
        assert_eq!(config.directory, Some(PathBuf::from("eater/Localization")));
        assert_eq!(config.scan.excluded_files.len(), 2);
        assert_eq!(config.scan.extension, "json");
        assert_eq!(config.unmapped, UnmappedPolicy::Skip);
        assert_eq!(config.default_locale, "en");

        let options = config.to_patch_options();
        assert_eq!(options.serialize.key_order, KeyOrder::Preserve);
        assert!(options.serialize.trailing_newline);
    }

    #[test]
    fn test_json_serialization() {
        let config = PatcherConfig {
            backup: true,
            ..PatcherConfig::default()
        };
        let json = config.to_json().unwrap();
        let deserialized = PatcherConfig::from_json(&json).unwrap();
        assert!(deserialized.backup);
        assert_eq!(deserialized.scan.excluded_files, config.scan.excluded_files);
    }

    #[test]
    fn test_relative_directory_follows_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.yaml");
        fs::write(&path, "directory: Localization\ndryRun: true\n").unwrap();

        let config = PatcherConfig::from_path(&path).unwrap();
        assert_eq!(config.directory, Some(dir.path().join("Localization")));
        assert!(config.dry_run);
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patcher.toml");
        fs::write(&path, "backup = true").unwrap();
        assert!(matches!(
            PatcherConfig::from_path(&path),
            Err(ConfigError::UnsupportedExtension(ext)) if ext == "toml"
        ));
    }
}
