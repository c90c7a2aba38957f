//! The index: names of tracked files, in the order they were added.

use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of registering a file with the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The name was appended to the index.
    Tracked(String),
    /// The name was already present; nothing changed.
    AlreadyTracked(String),
}

impl AddOutcome {
    pub fn name(&self) -> &str {
        match self {
            AddOutcome::Tracked(name) | AddOutcome::AlreadyTracked(name) => name,
        }
    }
}

/// Line-oriented store of tracked file names.
#[derive(Debug)]
pub struct Index {
    path: PathBuf,
}

impl Index {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Track the file at `path`.
    ///
    /// Only the file's base name is recorded.
    pub fn add(&self, path: &Path) -> Result<AddOutcome> {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if path.exists() => name.to_string(),
            _ => return Err(Error::file_not_found(path)),
        };

        if name.contains(['\n', '\r']) {
            return Err(Error::invalid_file_name(format!(
                "{:?} contains a line break",
                name
            )));
        }

        if self.contains(&name)? {
            debug!(%name, "file already tracked");
            return Ok(AddOutcome::AlreadyTracked(name));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", name)?;

        debug!(%name, "file tracked");
        Ok(AddOutcome::Tracked(name))
    }

    /// Tracked names in insertion order.
    ///
    /// Names are returned exactly as stored; only empty lines are skipped.
    pub fn list(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|n| n == name))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.list()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Index) {
        let temp_dir = TempDir::new().unwrap();
        let index = Index::new(temp_dir.path().join("index.txt"));
        (temp_dir, index)
    }

    #[test]
    fn test_empty_index() {
        let (_temp_dir, index) = setup();
        assert!(index.list().unwrap().is_empty());
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn test_add_records_base_name() {
        let (temp_dir, index) = setup();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("a.txt"), b"hello").unwrap();

        let outcome = index.add(&sub.join("a.txt")).unwrap();

        assert_eq!(outcome, AddOutcome::Tracked("a.txt".to_string()));
        assert_eq!(index.list().unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_add_twice_is_noop() {
        let (temp_dir, index) = setup();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();

        index.add(&file).unwrap();
        let outcome = index.add(&file).unwrap();

        assert_eq!(outcome, AddOutcome::AlreadyTracked("a.txt".to_string()));
        assert_eq!(index.list().unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_add_missing_file() {
        let (temp_dir, index) = setup();
        let result = index.add(&temp_dir.path().join("missing.txt"));

        assert!(matches!(result, Err(Error::FileNotFound { .. })));
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn test_add_path_without_name() {
        let (_temp_dir, index) = setup();
        assert!(matches!(
            index.add(Path::new("/")),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_list_skips_blank_lines() {
        let (temp_dir, index) = setup();
        fs::write(temp_dir.path().join("index.txt"), "a.txt\n\nb.txt\n").unwrap();
        assert_eq!(index.list().unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_name_with_trailing_space_is_kept_verbatim() {
        let (temp_dir, index) = setup();
        let file = temp_dir.path().join("a.txt ");
        fs::write(&file, b"hello").unwrap();

        assert_eq!(
            index.add(&file).unwrap(),
            AddOutcome::Tracked("a.txt ".to_string())
        );
        assert_eq!(
            index.add(&file).unwrap(),
            AddOutcome::AlreadyTracked("a.txt ".to_string())
        );
        assert_eq!(index.list().unwrap(), vec!["a.txt "]);
    }

    #[test]
    fn test_name_with_line_break_is_rejected() {
        let (temp_dir, index) = setup();
        let file = temp_dir.path().join("a\nb.txt");
        fs::write(&file, b"hello").unwrap();

        assert!(matches!(
            index.add(&file),
            Err(Error::InvalidFileName { .. })
        ));
        assert!(index.is_empty().unwrap());
    }

    #[test]
    fn test_list_handles_crlf_lines() {
        let (temp_dir, index) = setup();
        fs::write(temp_dir.path().join("index.txt"), "a.txt\r\nb.txt\r\n").unwrap();
        assert_eq!(index.list().unwrap(), vec!["a.txt", "b.txt"]);
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Listing returns first-seen order without duplicates
        #[test]
        fn prop_first_seen_order_without_duplicates(
            picks in prop::collection::vec(0usize..6, 0..20)
        ) {
            let (temp_dir, index) = setup();
            let work = temp_dir.path().join("work");
            fs::create_dir(&work).unwrap();

            let mut expected: Vec<String> = Vec::new();
            for i in picks {
                let name = format!("file{}.txt", i);
                let path = work.join(&name);
                fs::write(&path, name.as_bytes()).unwrap();
                index.add(&path)?;
                if !expected.contains(&name) {
                    expected.push(name);
                }
            }

            prop_assert_eq!(index.list()?, expected);
        }
    }
}
