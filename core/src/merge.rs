/// Idempotent merge of resolved updates into a locale map.

use std::collections::BTreeMap;

use crate::formats::LocaleMap;
use crate::update_spec::MergeMode;

/// Result of merging one file's updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// New map, present only when at least one key changed
    pub merged: Option<LocaleMap>,
    /// Keys whose value was inserted or replaced, in sorted order
    pub written_keys: Vec<String>,
    /// Every written key was absent before the merge
    pub added_only: bool,
}

impl MergeOutcome {
    fn unchanged() -> Self {
        Self {
            merged: None,
            written_keys: Vec::new(),
            added_only: false,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.merged.is_some()
    }
}

/// Merge `updates` into `existing`.
///
/// Keys not named in `updates` are carried over untouched. A key counts as
/// different when it is absent or holds another value. `sentinel` is only
/// consulted in [`MergeMode::SkipIfPresent`].
pub fn merge_entries(
    existing: &LocaleMap,
    updates: &BTreeMap<String, String>,
    mode: MergeMode,
    sentinel: Option<&str>,
) -> MergeOutcome {
    if mode == MergeMode::SkipIfPresent {
        if let Some(sentinel) = sentinel {
            if existing.contains_key(sentinel) {
                return MergeOutcome::unchanged();
            }
        }
    }

    let mut merged = existing.clone();
    let mut written_keys = Vec::new();
    let mut added_only = true;

    for (key, value) in updates {
        match existing.get(key) {
            Some(current) if current == value.as_str() => continue,
            Some(_) if mode == MergeMode::AddMissing => continue,
            Some(_) => added_only = false,
            None => {}
        }
        merged.insert(key.clone(), value.clone());
        written_keys.push(key.clone());
    }

    if written_keys.is_empty() {
        return MergeOutcome::unchanged();
    }

    MergeOutcome {
        merged: Some(merged),
        written_keys,
        added_only,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> LocaleMap {
        pairs.iter().copied().collect()
    }

    fn updates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn adds_new_key() {
        let outcome = merge_entries(
            &map(&[("a", "1")]),
            &updates(&[("b", "2")]),
            MergeMode::Overwrite,
            None,
        );
        assert_eq!(outcome.merged, Some(map(&[("a", "1"), ("b", "2")])));
        assert_eq!(outcome.written_keys, vec!["b".to_string()]);
        assert!(outcome.added_only);
    }

    #[test]
    fn overwrites_existing_key() {
        let outcome = merge_entries(
            &map(&[("a", "1")]),
            &updates(&[("a", "2")]),
            MergeMode::Overwrite,
            None,
        );
        assert_eq!(outcome.merged, Some(map(&[("a", "2")])));
        assert!(!outcome.added_only);
    }

    #[test]
    fn already_patched_is_unchanged() {
        let outcome = merge_entries(
            &map(&[("a", "2")]),
            &updates(&[("a", "2")]),
            MergeMode::Overwrite,
            None,
        );
        assert!(!outcome.is_changed());
        assert!(outcome.written_keys.is_empty());
    }

    #[test]
    fn preserves_untargeted_keys() {
        let existing = map(&[("profile.tutorial", "Tutorial"), ("units.kg", "kg"), ("x", "y")]);
        let upd = updates(&[("units.kg", "кг")]);
        let outcome = merge_entries(&existing, &upd, MergeMode::Overwrite, None);
        let merged = outcome.merged.unwrap();
        assert_eq!(merged.get("profile.tutorial"), Some("Tutorial"));
        assert_eq!(merged.get("x"), Some("y"));
        assert_eq!(merged.get("units.kg"), Some("кг"));
        assert_eq!(merged.keys().count(), 3);
    }

    #[test]
    fn add_missing_never_overwrites() {
        let existing = map(&[("stats.tab.weight", "Gewicht")]);
        let outcome = merge_entries(
            &existing,
            &updates(&[("stats.tab.weight", "Weight"), ("stats.tab.calories", "Calories")]),
            MergeMode::AddMissing,
            None,
        );
        let merged = outcome.merged.unwrap();
        assert_eq!(merged.get("stats.tab.weight"), Some("Gewicht"));
        assert_eq!(merged.get("stats.tab.calories"), Some("Calories"));
        assert_eq!(outcome.written_keys, vec!["stats.tab.calories".to_string()]);

        let again = merge_entries(
            &merged,
            &updates(&[("stats.tab.weight", "Weight"), ("stats.tab.calories", "Calories")]),
            MergeMode::AddMissing,
            None,
        );
        assert!(!again.is_changed());
    }

    #[test]
    fn skip_if_present_honours_sentinel() {
        let upd = updates(&[
            ("weight.loss.title", "You Lost %dg!"),
            ("weight.compare.50g", "An egg"),
        ]);

        let patched = map(&[("weight.loss.title", "Du hast %dg verloren!")]);
        let sentinel = Some("weight.loss.title");
        let outcome = merge_entries(&patched, &upd, MergeMode::SkipIfPresent, sentinel);
        assert!(!outcome.is_changed());

        let fresh = map(&[("other", "x")]);
        let outcome = merge_entries(&fresh, &upd, MergeMode::SkipIfPresent, sentinel);
        assert_eq!(outcome.written_keys.len(), 2);
        assert!(outcome.added_only);
    }

    #[test]
    fn empty_updates_change_nothing() {
        let outcome = merge_entries(
            &map(&[("a", "1")]),
            &BTreeMap::new(),
            MergeMode::Overwrite,
            None,
        );
        assert!(!outcome.is_changed());
    }
}
