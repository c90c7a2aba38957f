//! Append-only commit history.
//!
//! Each record is four lines: a blank separator, the message,
//! `Author: <name>` and `commit <id>`. Records are stored oldest first.

use crate::commit::{Commit, CommitId};
use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const AUTHOR_PREFIX: &str = "Author: ";
const COMMIT_PREFIX: &str = "commit ";

/// Line-oriented commit log.
#[derive(Debug)]
pub struct CommitLog {
    path: PathBuf,
}

impl CommitLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Render a commit as it is stored.
    pub fn format_record(commit: &Commit) -> String {
        format!(
            "\n{}\n{}{}\n{}{}\n",
            commit.message, AUTHOR_PREFIX, commit.author, COMMIT_PREFIX, commit.id
        )
    }

    /// Append a commit record.
    ///
    /// The whole record goes out in one write and is synced before returning.
    pub fn append(&self, commit: &Commit) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(Self::format_record(commit).as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    /// Id of the most recent complete record, or `None` if nothing was
    /// committed yet.
    pub fn last_commit_id(&self) -> Result<Option<CommitId>> {
        Ok(self.records()?.pop().map(|commit| commit.id))
    }

    /// Whether a commit with exactly this id was recorded.
    pub fn exists(&self, id: &str) -> Result<bool> {
        let content = self.read()?;
        Ok(content
            .lines()
            .filter_map(|line| line.strip_prefix(COMMIT_PREFIX))
            .any(|logged| logged == id))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.trim().is_empty())
    }

    /// Raw log lines, newest first.
    ///
    /// Storage is re-read on every call.
    pub fn lines_newest_first(&self) -> Result<impl Iterator<Item = String>> {
        let content = self.read()?;
        let lines: Vec<String> = content.lines().map(String::from).collect();
        Ok(lines.into_iter().rev())
    }

    /// Parse all complete records, oldest first.
    ///
    /// Fragments that do not form a full record (e.g. a truncated final
    /// append) are skipped.
    pub fn records(&self) -> Result<Vec<Commit>> {
        let content = self.read()?;
        let lines: Vec<&str> = content.lines().collect();
        let mut commits = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            if !lines[i].is_empty() {
                i += 1;
                continue;
            }

            let record = lines.get(i + 1..i + 4).and_then(|rest| {
                let author = rest[1].strip_prefix(AUTHOR_PREFIX)?;
                let id = CommitId::parse(rest[2].strip_prefix(COMMIT_PREFIX)?).ok()?;
                Some(Commit {
                    id,
                    message: rest[0].to_string(),
                    author: author.to_string(),
                })
            });

            match record {
                Some(commit) => {
                    commits.push(commit);
                    i += 4;
                }
                None => i += 1,
            }
        }

        Ok(commits)
    }
}
