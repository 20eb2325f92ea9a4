/// Storage formats for locale files
/// Every handler reads and writes the same flat key/value map
pub mod json;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Value for key '{key}' is not a string")]
    NotFlat { key: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Unknown,
}

impl FileFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Unknown,
        }
    }
}

/// Order of keys when a locale file is written back
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KeyOrder {
    /// Lexicographic by code point
    #[default]
    Sorted,
    /// Original order, new keys appended
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    pub key_order: KeyOrder,
    pub trailing_newline: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            key_order: KeyOrder::Sorted,
            trailing_newline: true,
        }
    }
}

/// Flat mapping of translation key to display text.
///
/// Insertion order is kept so that [`KeyOrder::Preserve`] can write the file
/// back the way it was read. Overwriting an existing key keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleMap {
    entries: Map<String, Value>,
}

impl LocaleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from a parsed document, rejecting anything that is not a
    /// single-level object of strings.
    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        let Value::Object(entries) = value else {
            return Err(FormatError::ParseError(
                "locale file must contain a single JSON object".into(),
            ));
        };

        if let Some((key, _)) = entries.iter().find(|(_, v)| !v.is_string()) {
            return Err(FormatError::NotFlat { key: key.clone() });
        }

        Ok(Self { entries })
    }

    /// Render the map as a document value with the requested key order.
    pub fn to_value(&self, order: KeyOrder) -> Value {
        match order {
            KeyOrder::Preserve => Value::Object(self.entries.clone()),
            KeyOrder::Sorted => {
                let sorted: BTreeMap<&String, &Value> = self.entries.iter().collect();
                Value::Object(
                    sorted
                        .into_iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                )
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries
            .insert(key.into(), Value::String(value.into()))
            .and_then(|old| match old {
                Value::String(s) => Some(s),
                _ => None,
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocaleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Trait for format-specific handlers
pub trait FormatHandler: Send + Sync {
    /// Parse file content into a flat map
    fn parse(&self, content: &str) -> Result<LocaleMap, FormatError>;

    /// Render a map in the canonical on-disk form
    fn serialize(&self, map: &LocaleMap, options: &SerializeOptions)
        -> Result<String, FormatError>;

    /// Get the format this handler supports
    fn format(&self) -> FileFormat;
}

/// Get appropriate handler for a file
pub fn get_handler(format: FileFormat) -> Option<Box<dyn FormatHandler>> {
    match format {
        FileFormat::Json => Some(Box::new(json::JsonHandler::new())),
        FileFormat::Unknown => None,
    }
}

/// Read and parse a locale file from disk
pub fn load_locale_file(
    path: &Path,
    handler: &dyn FormatHandler,
) -> Result<LocaleMap, FormatError> {
    let content = fs::read_to_string(path)?;
    handler.parse(&content)
}
