/// Placeholder parity between a locale's strings and the default locale's
///
/// Translated values must carry the same printf-style format tokens
/// (`%@`, `%d`, `%1$@`, `%.1f`, ...) as the default value for the same key,
/// otherwise the app formats them with the wrong arguments at runtime.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::update_spec::UpdateSpec;

// `%%` is matched first so that an escaped percent sign is never read as a token
static PRINTF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%%|%(?:\d+\$)?[-+0#]*\d*(?:\.\d+)?(?:hh|h|ll|l|z)?[@dDiuUxXfFeEgGcCsS]")
        .expect("valid printf placeholder regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderMismatch {
    pub locale: String,
    pub key: String,
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

/// Format tokens in `text`, sorted so that reordering is not a mismatch
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = PRINTF_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| *token != "%%")
        .map(str::to_string)
        .collect();
    tokens.sort();
    tokens
}

/// Compare every locale's values with the default locale's values.
///
/// Keys missing from the default table have nothing to compare against and
/// are ignored, as is the default locale itself.
pub fn check_placeholder_parity(
    spec: &UpdateSpec,
    default_locale: &str,
) -> Vec<PlaceholderMismatch> {
    let Some(reference) = spec.entry(default_locale) else {
        return Vec::new();
    };

    let mut mismatches = Vec::new();
    for (locale, table) in spec.locales() {
        if locale == default_locale {
            continue;
        }
        for (key, value) in table {
            let Some(reference_value) = reference.get(key) else {
                continue;
            };
            let expected = extract_placeholders(reference_value);
            let found = extract_placeholders(value);
            if expected != found {
                mismatches.push(PlaceholderMismatch {
                    locale: locale.to_string(),
                    key: key.clone(),
                    expected,
                    found,
                });
            }
        }
    }
    mismatches
}
