//! Per-commit snapshot directories.

use crate::commit::CommitId;
use crate::error::Result;
use crate::fsutil::copy_atomic;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What `restore` did to one tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreAction {
    /// The working file was overwritten with the snapshot copy.
    Restored,
    /// The file was absent from the snapshot, so the working file was removed.
    Deleted,
    /// Absent from both the snapshot and the working directory.
    Unchanged,
}

/// Stores one directory of file copies per commit.
///
/// ```text
/// commits/
///   <commit id>/
///     <tracked file name>
/// ```
#[derive(Debug)]
pub struct CommitStore {
    root: PathBuf,
}

impl CommitStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Snapshot directory for `id`.
    pub fn commit_dir(&self, id: &CommitId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Whether a snapshot directory exists for `id`.
    pub fn contains(&self, id: &CommitId) -> bool {
        self.commit_dir(id).is_dir()
    }

    /// Copy the tracked files in `work_dir` into the snapshot for `id`.
    ///
    /// Names that are missing or not regular files are skipped. A new
    /// snapshot is assembled in a staging directory and renamed into place;
    /// an existing one is reused and its files overwritten.
    ///
    /// Returns the number of files copied.
    pub fn snapshot<S: AsRef<str>>(
        &self,
        id: &CommitId,
        work_dir: &Path,
        names: &[S],
    ) -> Result<usize> {
        fs::create_dir_all(&self.root)?;
        let commit_dir = self.commit_dir(id);

        if commit_dir.is_dir() {
            debug!(%id, "reusing existing snapshot directory");
            return copy_tracked(work_dir, &commit_dir, names);
        }

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.root)?;
        let copied = copy_tracked(work_dir, staging.path(), names)?;

        // From here on the directory is ours to move or clean up.
        let staging = staging.keep();
        if let Err(e) = fs::rename(&staging, &commit_dir) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e.into());
        }

        debug!(%id, copied, "snapshot written");
        Ok(copied)
    }

    /// Restore the tracked files in `work_dir` to their state in `id`.
    ///
    /// A file missing from the snapshot did not exist at that commit, so its
    /// working copy is deleted.
    pub fn restore<S: AsRef<str>>(
        &self,
        id: &CommitId,
        work_dir: &Path,
        names: &[S],
    ) -> Result<Vec<(String, RestoreAction)>> {
        let commit_dir = self.commit_dir(id);
        let mut actions = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let stored = commit_dir.join(name);
            let target = work_dir.join(name);

            let action = if stored.is_file() {
                copy_atomic(&stored, &target)?;
                RestoreAction::Restored
            } else {
                match fs::remove_file(&target) {
                    Ok(()) => RestoreAction::Deleted,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => RestoreAction::Unchanged,
                    Err(e) => return Err(e.into()),
                }
            };

            debug!(%id, name, ?action, "restored file");
            actions.push((name.to_string(), action));
        }

        Ok(actions)
    }
}

fn copy_tracked<S: AsRef<str>>(work_dir: &Path, dest_dir: &Path, names: &[S]) -> Result<usize> {
    let mut copied = 0;
    for name in names {
        let name = name.as_ref();
        let src = work_dir.join(name);
        if !src.is_file() {
            debug!(name, "tracked file absent, not snapshotted");
            continue;
        }
        copy_atomic(&src, &dest_dir.join(name))?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHash;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        work: PathBuf,
        store: CommitStore,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let work = temp_dir.path().join("work");
        fs::create_dir(&work).unwrap();
        let store = CommitStore::new(temp_dir.path().join("commits"));
        Fixture {
            _temp_dir: temp_dir,
            work,
            store,
        }
    }

    fn id(n: u128) -> CommitId {
        CommitId::new(&ContentHash::hash_bytes(b"content"), n)
    }

    #[test]
    fn test_snapshot_copies_existing_files() {
        let f = setup();
        fs::write(f.work.join("a.txt"), b"hello").unwrap();

        let copied = f.store.snapshot(&id(1), &f.work, &["a.txt", "gone.txt"]).unwrap();

        assert_eq!(copied, 1);
        assert!(f.store.contains(&id(1)));
        let dir = f.store.commit_dir(&id(1));
        assert_eq!(fs::read(dir.join("a.txt")).unwrap(), b"hello");
        assert!(!dir.join("gone.txt").exists());
    }

    #[test]
    fn test_snapshot_leaves_no_staging_dirs() {
        let f = setup();
        fs::write(f.work.join("a.txt"), b"hello").unwrap();
        f.store.snapshot(&id(1), &f.work, &["a.txt"]).unwrap();

        let entries: Vec<_> = fs::read_dir(&f.store.root)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(id(1).as_str())]);
    }

    #[test]
    fn test_failed_rename_removes_staging_dir() {
        let f = setup();
        fs::write(f.work.join("a.txt"), b"hello").unwrap();
        fs::create_dir_all(&f.store.root).unwrap();
        // A plain file where the snapshot directory should go.
        fs::write(f.store.commit_dir(&id(1)), b"").unwrap();

        assert!(f.store.snapshot(&id(1), &f.work, &["a.txt"]).is_err());

        let entries: Vec<_> = fs::read_dir(&f.store.root)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(id(1).as_str())]);
    }

    #[test]
    fn test_snapshot_reuses_existing_dir() {
        let f = setup();
        fs::write(f.work.join("a.txt"), b"hello").unwrap();
        f.store.snapshot(&id(1), &f.work, &["a.txt"]).unwrap();

        fs::write(f.work.join("a.txt"), b"again").unwrap();
        f.store.snapshot(&id(1), &f.work, &["a.txt"]).unwrap();

        let dir = f.store.commit_dir(&id(1));
        assert_eq!(fs::read(dir.join("a.txt")).unwrap(), b"again");
    }

    #[test]
    fn test_restore_overwrites_and_deletes() {
        let f = setup();
        fs::write(f.work.join("a.txt"), b"hello").unwrap();
        f.store.snapshot(&id(1), &f.work, &["a.txt"]).unwrap();

        fs::write(f.work.join("a.txt"), b"world").unwrap();
        fs::write(f.work.join("b.txt"), b"new").unwrap();

        let actions = f
            .store
            .restore(&id(1), &f.work, &["a.txt", "b.txt", "c.txt"])
            .unwrap();

        assert_eq!(
            actions,
            vec![
                ("a.txt".to_string(), RestoreAction::Restored),
                ("b.txt".to_string(), RestoreAction::Deleted),
                ("c.txt".to_string(), RestoreAction::Unchanged),
            ]
        );
        assert_eq!(fs::read(f.work.join("a.txt")).unwrap(), b"hello");
        assert!(!f.work.join("b.txt").exists());
    }
}
