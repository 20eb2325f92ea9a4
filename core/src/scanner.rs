/// Locale file discovery with manifest exclusion
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Storage extension of locale files (default: json)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File names that are never patched, compared case-insensitively
    #[serde(default = "default_excluded_files")]
    pub excluded_files: Vec<String>,
}

pub(crate) fn default_extension() -> String {
    "json".to_string()
}

pub(crate) fn default_excluded_files() -> Vec<String> {
    vec!["contents.json".to_string()]
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            excluded_files: default_excluded_files(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleCandidate {
    pub path: PathBuf,
    pub file_name: String,
    pub locale: String,
}

/// Locale code of a file: everything before the first `.`
///
/// `pt.json` and `pt.BR.json` both give `pt`. Case is kept as-is.
pub fn locale_code_from_file_name(file_name: &str) -> Option<&str> {
    file_name.split('.').next().filter(|code| !code.is_empty())
}

#[derive(Debug)]
pub struct LocaleScanner {
    config: ScanConfig,
}

impl LocaleScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// List the locale files directly inside `root`, sorted by file name.
    pub fn scan(&self, root: &Path) -> Result<Vec<LocaleCandidate>, std::io::Error> {
        let mut files = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(candidate) = self.process_file(&path) {
                files.push(candidate);
            }
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    fn process_file(&self, path: &Path) -> Option<LocaleCandidate> {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!("skipping non UTF-8 file name: {}", path.display());
            return None;
        };

        let wanted = self.config.extension.trim_start_matches('.');
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
        if !matches_extension {
            return None;
        }

        if self.is_excluded(file_name) {
            debug!("skipping manifest file {}", file_name);
            return None;
        }

        let locale = locale_code_from_file_name(file_name)?;
        Some(LocaleCandidate {
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            locale: locale.to_string(),
        })
    }

    fn is_excluded(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.config
            .excluded_files
            .iter()
            .any(|excluded| excluded.to_lowercase() == lower)
    }
}
