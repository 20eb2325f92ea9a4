/// Per-file outcomes and run totals
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "message")]
pub enum FileStatus {
    /// Only new keys were written
    Added,
    /// At least one existing value was replaced
    Updated,
    /// File already carried every value
    Unchanged,
    /// No update entry applies to the file's locale
    Unmapped,
    /// Read, parse or write failed
    Failed(String),
}

impl FileStatus {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Added | Self::Updated)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Updated => "UPDATED",
            Self::Unchanged => "SKIP",
            Self::Unmapped => "UNMAPPED",
            Self::Failed(_) => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub path: PathBuf,
    pub file_name: String,
    pub locale: String,
    #[serde(flatten)]
    pub status: FileStatus,
    pub fell_back: bool,
    pub written_keys: Vec<String>,
}

impl FileOutcome {
    pub fn is_changed(&self) -> bool {
        self.status.is_changed()
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.label(), self.file_name)?;
        match &self.status {
            FileStatus::Added | FileStatus::Updated => {
                write!(f, " ({} keys", self.written_keys.len())?;
                if self.fell_back {
                    write!(f, ", default locale")?;
                }
                write!(f, ")")
            }
            FileStatus::Unmapped => write!(f, " (no entry for '{}')", self.locale),
            FileStatus::Failed(message) => write!(f, ": {message}"),
            FileStatus::Unchanged => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSummary {
    pub patch: String,
    pub directory: PathBuf,
    pub dry_run: bool,
    pub changed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub total: usize,
    pub fallbacks: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl PatchSummary {
    pub fn new(patch: impl Into<String>, directory: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            patch: patch.into(),
            directory: directory.into(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: FileOutcome) {
        self.total += 1;
        if outcome.is_changed() {
            self.changed += 1;
        } else if matches!(outcome.status, FileStatus::Failed(_)) {
            self.errored += 1;
        } else {
            self.skipped += 1;
        }
        if outcome.fell_back {
            self.fallbacks += 1;
        }
        self.outcomes.push(outcome);
    }
}

impl fmt::Display for PatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "Dry run. Would update" } else { "Done. Updated" };
        write!(
            f,
            "{verb} {}/{} files ({} skipped, {} errors)",
            self.changed, self.total, self.skipped, self.errored
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: FileStatus) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            locale: name.split('.').next().unwrap_or_default().to_string(),
            status,
            fell_back: false,
            written_keys: vec!["feedback.nav".to_string()],
        }
    }

    #[test]
    fn counts_by_status() {
        let mut summary = PatchSummary::new("feedback_nav", "Localization", false);
        summary.record(outcome("de.json", FileStatus::Updated));
        summary.record(outcome("en.json", FileStatus::Unchanged));
        summary.record(outcome("xx.json", FileStatus::Unmapped));
        summary.record(outcome("zz.json", FileStatus::Failed("bad json".into())));

        assert_eq!(summary.changed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.errored, 1);
        assert_eq!(summary.total, 4);
        assert_eq!(
            summary.to_string(),
            "Done. Updated 1/4 files (2 skipped, 1 errors)"
        );
    }

    #[test]
    fn renders_per_file_lines() {
        let mut added = outcome("xx.json", FileStatus::Added);
        added.fell_back = true;
        assert_eq!(added.to_string(), "ADDED xx.json (1 keys, default locale)");
        assert_eq!(
            outcome("bad.json", FileStatus::Failed("JSON parse error".into())).to_string(),
            "ERROR bad.json: JSON parse error"
        );
        assert_eq!(outcome("en.json", FileStatus::Unchanged).to_string(), "SKIP en.json");
    }

    #[test]
    fn serializes_status_inline() {
        let failed = outcome("bad.json", FileStatus::Failed("oops".into()));
        let json = serde_json::to_value(failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "oops");
        assert_eq!(json["fileName"], "bad.json");
    }
}
