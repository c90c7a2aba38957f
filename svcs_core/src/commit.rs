//! Commit identity and records.

use crate::error::{Error, Result};
use crate::hash::{ContentHash, HASH_HEX_LEN};
use serde::Serialize;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity of a commit: the content hash followed by a uniqueness suffix.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Build an id from a content hash and a suffix.
    pub fn new(hash: &ContentHash, suffix: u128) -> Self {
        CommitId(format!("{}{}", hash.to_hex(), suffix))
    }

    /// Build an id for `hash`, using the current time in nanoseconds as suffix.
    pub fn generate(hash: &ContentHash) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::new(hash, nanos)
    }

    /// Parse an id supplied from outside (command line, log file).
    ///
    /// Ids name snapshot directories, so only ASCII alphanumerics are accepted.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::invalid_commit_id("Commit id cannot be empty"));
        }

        if let Some(c) = s.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(Error::invalid_commit_id(format!(
                "Unexpected character {:?} in {}",
                c, s
            )));
        }

        Ok(CommitId(s.to_string()))
    }

    /// The content-hash part of the id, if the id is long enough to carry one.
    pub fn content_prefix(&self) -> Option<&str> {
        self.0.get(..HASH_HEX_LEN)
    }

    /// Whether this id was allocated for `hash`.
    pub fn matches_content(&self, hash: &ContentHash) -> bool {
        self.0.starts_with(&hash.to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", self.0)
    }
}

/// A recorded commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub author: String,
}

impl Commit {
    /// Create a commit record. Line breaks in `message` and `author` are
    /// flattened so the record stays one field per line.
    pub fn new(id: CommitId, message: &str, author: &str) -> Self {
        Self {
            id,
            message: single_line(message),
            author: single_line(author),
        }
    }
}

fn single_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_layout() {
        let hash = ContentHash::hash_bytes(b"hello");
        let id = CommitId::new(&hash, 12345);

        assert_eq!(id.as_str(), format!("{}12345", hash.to_hex()));
        assert_eq!(id.content_prefix(), Some(hash.to_hex().as_str()));
        assert!(id.matches_content(&hash));
        assert!(!id.matches_content(&ContentHash::hash_bytes(b"world")));
    }

    #[test]
    fn test_generated_ids_differ_in_suffix_only() {
        let hash = ContentHash::hash_bytes(b"hello");
        let id = CommitId::generate(&hash);

        assert!(id.matches_content(&hash));
        assert!(id.as_str().len() > HASH_HEX_LEN);
        assert!(id.as_str()[HASH_HEX_LEN..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_parse_rejects_path_like_ids() {
        assert!(CommitId::parse("").is_err());
        assert!(CommitId::parse("../etc").is_err());
        assert!(CommitId::parse("abc/def").is_err());
        assert!(CommitId::parse("abc def").is_err());
        assert!(CommitId::parse("abc123").is_ok());
    }

    #[test]
    fn test_short_id_has_no_content_prefix() {
        let id = CommitId::parse("abc").unwrap();
        assert_eq!(id.content_prefix(), None);
    }

    #[test]
    fn test_commit_flattens_line_breaks() {
        let id = CommitId::parse("abc").unwrap();
        let commit = Commit::new(id, "first\nline\r\nmore", "Al\nice");
        assert_eq!(commit.message, "first line more");
        assert_eq!(commit.author, "Al ice");
    }
}
