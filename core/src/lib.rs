pub mod backup;
pub mod config;
pub mod formats;
pub mod merge;
pub mod patcher;
pub mod placeholder;
pub mod report;
pub mod scanner;
pub mod update_spec;

pub use config::{ConfigError, PatcherConfig};
pub use formats::{FormatError, KeyOrder, LocaleMap, SerializeOptions};
pub use merge::{merge_entries, MergeOutcome};
pub use patcher::{apply_updates, LocalePatcher, PatchError, PatchOptions, UnmappedPolicy};
pub use placeholder::{check_placeholder_parity, PlaceholderMismatch};
pub use report::{FileOutcome, FileStatus, PatchSummary};
pub use scanner::{locale_code_from_file_name, LocaleCandidate, LocaleScanner, ScanConfig};
pub use update_spec::{MergeMode, PatchDocument, Resolution, SpecError, UpdateEntry, UpdateSpec};
