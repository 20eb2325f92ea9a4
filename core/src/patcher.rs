/// The locale file patcher: one idempotent pass over a locale directory.
///
/// Files are processed one at a time in file name order. A failure on one
/// file is recorded in its [`FileOutcome`] and never stops the run; only
/// problems with the directory itself (or a strict placeholder check) are
/// returned as [`PatchError`] before any file is touched.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backup::write_atomic;
use crate::formats::{
    get_handler, load_locale_file, FileFormat, FormatHandler, SerializeOptions,
};
use crate::merge::merge_entries;
use crate::placeholder::check_placeholder_parity;
use crate::report::{FileOutcome, FileStatus, PatchSummary};
use crate::scanner::{LocaleCandidate, LocaleScanner, ScanConfig};
use crate::update_spec::{MergeMode, UpdateSpec};

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("locale directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("unsupported locale file extension: {0}")]
    UnsupportedFormat(String),

    #[error("failed to list locale directory {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{count} translated value(s) do not carry the default locale's placeholders")]
    PlaceholderMismatch { count: usize },
}

/// What to do with a file whose locale code has no entry of its own
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UnmappedPolicy {
    /// Apply the default locale's entry and log a warning
    #[default]
    Fallback,
    /// Leave the file untouched
    Skip,
    /// Fill in the default locale's keys where absent, keep existing values
    KeepExisting,
}

#[derive(Debug, Clone)]
pub struct PatchOptions {
    pub default_locale: String,
    pub scan: ScanConfig,
    pub serialize: SerializeOptions,
    pub unmapped: UnmappedPolicy,
    pub backup: bool,
    pub dry_run: bool,
    pub strict_placeholders: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            scan: ScanConfig::default(),
            serialize: SerializeOptions::default(),
            unmapped: UnmappedPolicy::default(),
            backup: false,
            dry_run: false,
            strict_placeholders: false,
        }
    }
}

pub struct LocalePatcher {
    options: PatchOptions,
    scanner: LocaleScanner,
    handler: Box<dyn FormatHandler>,
}

impl LocalePatcher {
    pub fn new(options: PatchOptions) -> Result<Self, PatchError> {
        let handler = get_handler(FileFormat::from_extension(&options.scan.extension))
            .ok_or_else(|| PatchError::UnsupportedFormat(options.scan.extension.clone()))?;
        let scanner = LocaleScanner::new(options.scan.clone());
        Ok(Self {
            options,
            scanner,
            handler,
        })
    }

    /// Apply `spec` to every locale file in `directory`.
    pub fn apply_updates(
        &self,
        directory: &Path,
        spec: &UpdateSpec,
    ) -> Result<PatchSummary, PatchError> {
        if !directory.is_dir() {
            return Err(PatchError::DirectoryNotFound(directory.to_path_buf()));
        }
        let directory = dunce::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf());
        let default_locale = self.options.default_locale.as_str();

        if !spec.contains_locale(default_locale) {
            warn!(
                "patch '{}' has no entry for default locale '{}'; \
                 unmapped locales will be left alone",
                spec.name(),
                default_locale
            );
        }

        let mismatches = check_placeholder_parity(spec, default_locale);
        for mismatch in &mismatches {
            warn!(
                "patch '{}': '{}' in locale '{}' has placeholders {:?}, expected {:?}",
                spec.name(),
                mismatch.key,
                mismatch.locale,
                mismatch.found,
                mismatch.expected
            );
        }
        if self.options.strict_placeholders && !mismatches.is_empty() {
            return Err(PatchError::PlaceholderMismatch {
                count: mismatches.len(),
            });
        }

        let candidates = self.scanner.scan(&directory).map_err(|source| PatchError::Scan {
            path: directory.clone(),
            source,
        })?;

        let mut summary = PatchSummary::new(spec.name(), &directory, self.options.dry_run);
        for candidate in &candidates {
            summary.record(self.patch_file(candidate, spec));
        }

        info!("{}: {}", spec.name(), summary);
        Ok(summary)
    }

    /// Patch a single locale file. Every failure is folded into the outcome.
    pub fn patch_file(&self, candidate: &LocaleCandidate, spec: &UpdateSpec) -> FileOutcome {
        let mut outcome = FileOutcome {
            path: candidate.path.clone(),
            file_name: candidate.file_name.clone(),
            locale: candidate.locale.clone(),
            status: FileStatus::Unchanged,
            fell_back: false,
            written_keys: Vec::new(),
        };

        let existing = match load_locale_file(&candidate.path, self.handler.as_ref()) {
            Ok(map) => map,
            Err(err) => {
                warn!("skipping {}: {}", candidate.file_name, err);
                outcome.status = FileStatus::Failed(err.to_string());
                return outcome;
            }
        };

        let default_locale = self.options.default_locale.as_str();
        let policy = spec.unmapped().unwrap_or(self.options.unmapped);
        let Some(resolution) = spec.resolve(&candidate.locale, default_locale, policy) else {
            debug!("{}: no entry for locale '{}'", candidate.file_name, candidate.locale);
            outcome.status = FileStatus::Unmapped;
            return outcome;
        };
        if resolution.fell_back {
            warn!(
                "{}: patch '{}' has no '{}' entry, {} '{}'",
                candidate.file_name,
                spec.name(),
                candidate.locale,
                if resolution.keep_existing { "filling gaps from" } else { "applying" },
                default_locale
            );
        }
        outcome.fell_back = resolution.fell_back;

        let mode = if resolution.keep_existing {
            MergeMode::AddMissing
        } else {
            spec.mode()
        };
        let merge = merge_entries(
            &existing,
            &resolution.entries,
            mode,
            spec.sentinel_key(default_locale),
        );
        let Some(merged) = merge.merged else {
            debug!("{}: already up to date", candidate.file_name);
            return outcome;
        };

        let rendered = match self.handler.serialize(&merged, &self.options.serialize) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!("failed to render {}: {}", candidate.file_name, err);
                outcome.status = FileStatus::Failed(err.to_string());
                return outcome;
            }
        };

        if !self.options.dry_run {
            let written = write_atomic(&candidate.path, rendered.as_bytes(), self.options.backup);
            if let Err(err) = written {
                warn!("failed to write {}: {}", candidate.file_name, err);
                outcome.status = FileStatus::Failed(err.to_string());
                return outcome;
            }
        }

        outcome.status = if merge.added_only {
            FileStatus::Added
        } else {
            FileStatus::Updated
        };
        outcome.written_keys = merge.written_keys;
        info!(
            "{} {} ({} keys)",
            if self.options.dry_run { "would patch" } else { "patched" },
            candidate.file_name,
            outcome.written_keys.len()
        );
        outcome
    }
}

/// Apply `spec` to `directory` with default options and the given fallback locale.
pub fn apply_updates(
    directory: &Path,
    spec: &UpdateSpec,
    default_locale: &str,
) -> Result<PatchSummary, PatchError> {
    let patcher = LocalePatcher::new(PatchOptions {
        default_locale: default_locale.to_string(),
        ..PatchOptions::default()
    })?;
    patcher.apply_updates(directory, spec)
}
