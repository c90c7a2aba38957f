//! Atomic file writes.

use crate::error::Result;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Directory a temp file for `path` should live in, so the final rename
/// stays on one filesystem.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replace the contents of `path` with `contents`.
///
/// The data is written to a temp file next to `path` and renamed over it,
/// so readers see either the old or the new contents.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir(path))?;
    temp_file.write_all(contents)?;
    temp_file.as_file().sync_data()?;
    temp_file.persist(path)?;
    Ok(())
}

/// Copy `src` over `dest` through a temp file in `dest`'s directory.
pub(crate) fn copy_atomic(src: &Path, dest: &Path) -> Result<u64> {
    let mut reader = fs::File::open(src)?;
    let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir(dest))?;
    let copied = io::copy(&mut reader, &mut temp_file)?;
    temp_file.as_file().sync_data()?;
    temp_file.persist(dest)?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.txt");

        write_atomic(&path, b"Alice").unwrap();
        write_atomic(&path, b"Bob").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"Bob");
        // No temp files left behind
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_copy_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.txt");
        let dest = temp_dir.path().join("dest.txt");
        fs::write(&src, b"hello").unwrap();
        fs::write(&dest, b"old contents").unwrap();

        let copied = copy_atomic(&src, &dest).unwrap();

        assert_eq!(copied, 5);
        assert_eq!(fs::read(&dest).unwrap(), b"hello");
    }

    #[test]
    fn test_copy_atomic_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let result = copy_atomic(
            &temp_dir.path().join("missing"),
            &temp_dir.path().join("dest"),
        );
        assert!(result.is_err());
        assert!(!temp_dir.path().join("dest").exists());
    }
}
