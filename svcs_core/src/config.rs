//! The configured username.

use crate::error::{Error, Result};
use crate::fsutil::write_atomic;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stores the current username as raw text.
#[derive(Debug)]
pub struct UserConfig {
    path: PathBuf,
}

impl UserConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The stored username, or `None` if it was never set.
    pub fn username(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(name) if name.is_empty() => Ok(None),
            Ok(name) => Ok(Some(name)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored username.
    pub fn set_username(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_username("Username cannot be empty"));
        }
        if name.contains(['\n', '\r']) {
            return Err(Error::invalid_username(
                "Username must not contain line breaks",
            ));
        }

        write_atomic(&self.path, name.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unset_username() {
        let temp_dir = TempDir::new().unwrap();
        let config = UserConfig::new(temp_dir.path().join("config.txt"));
        assert_eq!(config.username().unwrap(), None);

        fs::write(temp_dir.path().join("config.txt"), "").unwrap();
        assert_eq!(config.username().unwrap(), None);
    }

    #[test]
    fn test_set_and_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config = UserConfig::new(temp_dir.path().join("config.txt"));

        config.set_username("Alice").unwrap();
        assert_eq!(config.username().unwrap().as_deref(), Some("Alice"));

        config.set_username("Bob Smith").unwrap();
        assert_eq!(config.username().unwrap().as_deref(), Some("Bob Smith"));

        // Stored raw, no trailing newline
        let raw = fs::read_to_string(temp_dir.path().join("config.txt")).unwrap();
        assert_eq!(raw, "Bob Smith");
    }

    #[test]
    fn test_invalid_usernames() {
        let temp_dir = TempDir::new().unwrap();
        let config = UserConfig::new(temp_dir.path().join("config.txt"));

        assert!(matches!(
            config.set_username(""),
            Err(Error::InvalidUsername { .. })
        ));
        assert!(matches!(
            config.set_username("Al\nice"),
            Err(Error::InvalidUsername { .. })
        ));
        assert_eq!(config.username().unwrap(), None);
    }
}
