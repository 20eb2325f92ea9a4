/// JSON format handler
/// Reads flat string objects and writes them back in canonical form

use super::{FileFormat, FormatError, FormatHandler, LocaleMap, SerializeOptions};
use serde_json::Value;

pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for JsonHandler {
    fn parse(&self, content: &str) -> Result<LocaleMap, FormatError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let value: Value = serde_json::from_str(content)
            .map_err(|e| FormatError::ParseError(format!("JSON parse error: {}", e)))?;

        LocaleMap::from_value(value)
    }

    fn serialize(
        &self,
        map: &LocaleMap,
        options: &SerializeOptions,
    ) -> Result<String, FormatError> {
        // serde_json leaves non-ASCII characters unescaped and indents with two spaces
        let mut out = serde_json::to_string_pretty(&map.to_value(options.key_order))
            .map_err(|e| FormatError::SerializationError(format!("JSON serialize error: {}", e)))?;

        if options.trailing_newline {
            out.push('\n');
        }
        Ok(out)
    }

    fn format(&self) -> FileFormat {
        FileFormat::Json
    }
}
