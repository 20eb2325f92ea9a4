use chrono::Local;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub backup_path: Option<PathBuf>,
    pub final_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("failed to create backup copy: {0}")]
    BackupCreate(String),
}

/// Replace `target` with `contents` through a sibling temporary file.
///
/// The target either keeps its old bytes or receives all of the new ones.
/// With `keep_backup`, the previous file is first copied to
/// `<name>.bak.<timestamp>` next to it.
pub fn write_atomic(
    target: &Path,
    contents: &[u8],
    keep_backup: bool,
) -> Result<WriteOutcome, BackupError> {
    let parent = target
        .parent()
        .ok_or_else(|| BackupError::BackupCreate("target path has no parent directory".into()))?;

    let backup_path = if keep_backup && target.exists() {
        Some(copy_to_backup(target, parent)?)
    } else {
        None
    };

    let temp_path = build_temp_path(target);
    if let Err(err) = write_synced(&temp_path, contents).and_then(|()| swap(&temp_path, target)) {
        let _ = fs::remove_file(&temp_path);
        return Err(BackupError::Io(err));
    }

    Ok(WriteOutcome {
        backup_path,
        final_path: target.to_path_buf(),
    })
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(target_os = "windows")]
fn swap(temp_path: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(temp_path, target) {
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            fs::remove_file(target)?;
            fs::rename(temp_path, target)
        }
        other => other,
    }
}

#[cfg(not(target_os = "windows"))]
fn swap(temp_path: &Path, target: &Path) -> io::Result<()> {
    fs::rename(temp_path, target)
}

/// Copy `target` to a backup that never replaces an earlier one. Several
/// writes within the same second get `.1`, `.2`, ... suffixes.
fn copy_to_backup(target: &Path, parent: &Path) -> Result<PathBuf, BackupError> {
    let base = build_backup_path(target, parent);
    let mut source = File::open(target).map_err(|err| BackupError::BackupCreate(err.to_string()))?;

    for attempt in 0..1000u32 {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            let mut name = base.clone().into_os_string();
            name.push(format!(".{attempt}"));
            PathBuf::from(name)
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut backup) => {
                io::copy(&mut source, &mut backup)
                    .and_then(|_| backup.sync_all())
                    .map_err(|err| BackupError::BackupCreate(err.to_string()))?;
                return Ok(candidate);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(BackupError::BackupCreate(err.to_string())),
        }
    }
    Err(BackupError::BackupCreate("no free backup name".into()))
}

fn build_backup_path(target: &Path, parent: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "locale".into());
    parent.join(format!("{name}.bak.{timestamp}"))
}

pub(crate) fn build_temp_path(target: &Path) -> PathBuf {
    let mut temp = target.to_path_buf();
    let pid = std::process::id();
    let suffix = format!("__tmp__pid_{}", pid);
    match temp.file_name() {
        Some(name) => {
            let mut os_string = name.to_os_string();
            os_string.push(suffix);
            temp.set_file_name(os_string);
        }
        None => {
            temp.push(format!("temp_{pid}"));
        }
    }
    temp
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replaces_contents_without_leftovers() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("en.json");
        fs::write(&target, b"{}\n").unwrap();

        let outcome = write_atomic(&target, b"{\n  \"a\": \"1\"\n}\n", false).unwrap();
        assert!(outcome.backup_path.is_none());
        assert_eq!(fs::read_to_string(&target).unwrap(), "{\n  \"a\": \"1\"\n}\n");

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn keeps_backup_copy_when_asked() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("de.json");
        fs::write(&target, b"original").unwrap();

        let outcome = write_atomic(&target, b"patched", true).unwrap();
        let backup = outcome.backup_path.unwrap();
        assert_eq!(fs::read(&backup).unwrap(), b"original");
        assert_eq!(fs::read(&target).unwrap(), b"patched");
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("de.json.bak."));
    }

    #[test]
    fn repeated_backups_never_replace_the_first() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("en.json");
        fs::write(&target, b"original").unwrap();

        let first = write_atomic(&target, b"first patch", true).unwrap();
        let second = write_atomic(&target, b"second patch", true).unwrap();

        let first = first.backup_path.unwrap();
        let second = second.backup_path.unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read(&first).unwrap(), b"original");
        assert_eq!(fs::read(&second).unwrap(), b"first patch");
        assert_eq!(fs::read(&target).unwrap(), b"second patch");
    }

    #[test]
    fn failed_swap_leaves_target_intact() {
        let dir = tempdir().unwrap();
        // a directory in place of the target makes the rename fail
        let target = dir.path().join("fr.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        assert!(write_atomic(&target, b"{}", false).is_err());
        assert!(target.is_dir());
        assert!(!build_temp_path(&target).exists());
    }
}
