/// Update tables: the keys and values each locale receives in one patch run
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::patcher::UnmappedPolicy;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("update table has no locale entries")]
    Empty,

    #[error("locale '{locale}' gives a single value but the patch document has no `key`")]
    MissingKey { locale: String },

    #[error("failed to read patch document: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse patch document: {0}")]
    Parse(String),

    #[error("unsupported patch document extension: {0}")]
    UnsupportedExtension(String),
}

/// One locale's share of a patch document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UpdateEntry {
    /// Value for the document-level `key`
    Single(String),
    /// Several keys at once
    Table(BTreeMap<String, String>),
}

/// How resolved entries are merged into an existing locale file
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MergeMode {
    /// Write every key whose value differs
    #[default]
    Overwrite,
    /// Only insert keys that are absent
    AddMissing,
    /// Leave the file alone when the sentinel key already exists
    SkipIfPresent,
}

/// Serialized form of an update table, as stored in `patches/*.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub mode: MergeMode,
    #[serde(default)]
    pub sentinel: Option<String>,
    #[serde(default)]
    pub fill_from_default: bool,
    /// Overrides the run's unmapped-locale policy for this document
    #[serde(default)]
    pub unmapped: Option<UnmappedPolicy>,
    pub locales: BTreeMap<String, UpdateEntry>,
}

impl PatchDocument {
    /// Load a patch document from YAML (`.yaml`/`.yml`) or JSON (`.json`)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            other => Err(SpecError::UnsupportedExtension(other.to_string())),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, SpecError> {
        serde_yaml::from_str(content).map_err(|e| SpecError::Parse(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self, SpecError> {
        serde_json::from_str(content).map_err(|e| SpecError::Parse(e.to_string()))
    }
}

/// Updates that apply to one file after locale resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub entries: BTreeMap<String, String>,
    /// The default locale's entry was used because the file's own code has none
    pub fell_back: bool,
    /// Existing values win over `entries`; only absent keys are filled in
    pub keep_existing: bool,
}

/// Validated update table, normalized to key/value tables per locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSpec {
    name: String,
    mode: MergeMode,
    sentinel: Option<String>,
    fill_from_default: bool,
    unmapped: Option<UnmappedPolicy>,
    locales: BTreeMap<String, BTreeMap<String, String>>,
}

impl UpdateSpec {
    pub fn new(locales: BTreeMap<String, BTreeMap<String, String>>) -> Result<Self, SpecError> {
        if locales.is_empty() {
            return Err(SpecError::Empty);
        }
        Ok(Self {
            name: "patch".into(),
            mode: MergeMode::default(),
            sentinel: None,
            fill_from_default: false,
            unmapped: None,
            locales,
        })
    }

    /// Normalize a parsed document. Single-string entries are expanded
    /// against the document's `key`.
    pub fn from_document(doc: PatchDocument) -> Result<Self, SpecError> {
        let mut locales = BTreeMap::new();
        for (locale, entry) in doc.locales {
            let table = match entry {
                UpdateEntry::Table(table) => table,
                UpdateEntry::Single(value) => {
                    let key = doc
                        .key
                        .clone()
                        .ok_or_else(|| SpecError::MissingKey { locale: locale.clone() })?;
                    BTreeMap::from([(key, value)])
                }
            };
            locales.insert(locale, table);
        }

        let mut spec = Self::new(locales)?
            .with_mode(doc.mode)
            .with_fill_from_default(doc.fill_from_default);
        spec.sentinel = doc.sentinel;
        spec.unmapped = doc.unmapped;
        if let Some(name) = doc.name {
            spec.name = name;
        }
        Ok(spec)
    }

    /// Load and validate a patch document; the file stem names the patch
    /// unless the document sets `name`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let doc = PatchDocument::from_path(path)?;
        let has_name = doc.name.is_some();
        let mut spec = Self::from_document(doc)?;
        if !has_name {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                spec.name = stem.to_string();
            }
        }
        Ok(spec)
    }

    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sentinel(mut self, key: impl Into<String>) -> Self {
        self.sentinel = Some(key.into());
        self
    }

    pub fn with_fill_from_default(mut self, fill: bool) -> Self {
        self.fill_from_default = fill;
        self
    }

    pub fn with_unmapped(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped = Some(policy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Unmapped-locale policy set by the patch document, if any
    pub fn unmapped(&self) -> Option<UnmappedPolicy> {
        self.unmapped
    }

    pub fn locales(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> {
        self.locales.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn entry(&self, locale: &str) -> Option<&BTreeMap<String, String>> {
        self.locales.get(locale)
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Key whose presence marks a file as already patched. Falls back to the
    /// first key of the default locale's table.
    pub fn sentinel_key(&self, default_locale: &str) -> Option<&str> {
        if let Some(sentinel) = &self.sentinel {
            return Some(sentinel.as_str());
        }
        self.locales
            .get(default_locale)
            .or_else(|| self.locales.values().next())
            .and_then(|table| table.keys().next())
            .map(String::as_str)
    }

    /// Resolve the entries that apply to a file with locale `code`.
    ///
    /// Returns `None` when neither `code` nor the default locale has an entry,
    /// or when `code` is unmapped and the policy says to skip it.
    pub fn resolve(
        &self,
        code: &str,
        default_locale: &str,
        policy: UnmappedPolicy,
    ) -> Option<Resolution> {
        let default = self.locales.get(default_locale);

        if let Some(own) = self.locales.get(code) {
            let mut entries = own.clone();
            if self.fill_from_default {
                if let Some(default) = default {
                    for (key, value) in default {
                        entries.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                }
            }
            return Some(Resolution {
                entries,
                fell_back: false,
                keep_existing: false,
            });
        }

        match policy {
            UnmappedPolicy::Skip => None,
            UnmappedPolicy::Fallback | UnmappedPolicy::KeepExisting => {
                default.map(|entries| Resolution {
                    entries: entries.clone(),
                    fell_back: true,
                    keep_existing: policy == UnmappedPolicy::KeepExisting,
                })
            }
        }
    }
}
