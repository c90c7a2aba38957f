//! Repository context and the commands that operate on it.

use crate::commit::{Commit, CommitId};
use crate::config::UserConfig;
use crate::error::{Error, Result};
use crate::hash::ContentHash;
use crate::index::{AddOutcome, Index};
use crate::log::CommitLog;
use crate::snapshot::{CommitStore, RestoreAction};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of a `commit` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// A new commit was recorded.
    Committed { commit: Commit, files: usize },
    /// Tracked content matches the previous commit; nothing was written.
    NothingToCommit,
}

/// A repository: the `vcs` directory holding history, plus the working
/// directory that tracked names resolve against.
///
/// Layout of the `vcs` directory:
/// - `config.txt` username
/// - `index.txt` tracked file names, one per line
/// - `log.txt` commit records, oldest first
/// - `commits/<id>/` snapshot copies
#[derive(Debug)]
pub struct Repository {
    vcs_dir: PathBuf,
    work_dir: PathBuf,
    config: UserConfig,
    index: Index,
    log: CommitLog,
    commits: CommitStore,
}

impl Repository {
    /// Open the repository at `vcs_dir`, creating its directories if needed.
    pub fn open<P: AsRef<Path>, W: AsRef<Path>>(vcs_dir: P, work_dir: W) -> Result<Self> {
        let vcs_dir = vcs_dir.as_ref().to_path_buf();
        let work_dir = work_dir.as_ref().to_path_buf();

        let commits_dir = vcs_dir.join("commits");
        fs::create_dir_all(&commits_dir)?;

        Ok(Self {
            config: UserConfig::new(vcs_dir.join("config.txt")),
            index: Index::new(vcs_dir.join("index.txt")),
            log: CommitLog::new(vcs_dir.join("log.txt")),
            commits: CommitStore::new(commits_dir),
            vcs_dir,
            work_dir,
        })
    }

    pub fn vcs_dir(&self) -> &Path {
        &self.vcs_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn log(&self) -> &CommitLog {
        &self.log
    }

    pub fn commit_store(&self) -> &CommitStore {
        &self.commits
    }

    /// Current username, if configured.
    pub fn username(&self) -> Result<Option<String>> {
        self.config.username()
    }

    /// Set or show the username.
    ///
    /// With `name`, stores it. Without, asks `prompt` only if no username is
    /// stored yet. Returns the username in effect afterwards.
    pub fn configure<F>(&self, name: Option<&str>, prompt: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        match name {
            Some(name) => self.config.set_username(name)?,
            None => {
                if self.config.username()?.is_none() {
                    let answer = prompt()?;
                    self.config
                        .set_username(answer.trim_end_matches(['\r', '\n']))?;
                }
            }
        }

        self.config.username()?.ok_or(Error::NoUsername)
    }

    /// Track the file at `path` (relative paths resolve against the working
    /// directory).
    pub fn add(&self, path: &Path) -> Result<AddOutcome> {
        self.index.add(&self.work_dir.join(path))
    }

    /// Tracked names in the order they were added.
    pub fn tracked(&self) -> Result<Vec<String>> {
        self.index.list()
    }

    /// Record a commit if tracked content changed since the last one.
    pub fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let author = self.config.username()?.ok_or(Error::NoUsername)?;

        let tracked = self.index.list()?;
        if tracked.is_empty() {
            return Err(Error::NoTrackedFiles);
        }

        let hash = ContentHash::of_files(&self.work_dir, &tracked)?;
        debug!(%hash, files = tracked.len(), "hashed tracked files");

        if let Some(last) = self.log.last_commit_id()?
            && last.matches_content(&hash)
        {
            debug!(%last, "content unchanged since last commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        let commit = Commit::new(CommitId::generate(&hash), message, &author);

        // Snapshot before logging: a logged id always has its files.
        let files = self
            .commits
            .snapshot(&commit.id, &self.work_dir, &tracked)?;
        self.log.append(&commit)?;

        info!(id = %commit.id, author = %commit.author, files, "changes committed");
        Ok(CommitOutcome::Committed { commit, files })
    }

    /// Restore tracked files to their state at commit `id`.
    pub fn checkout(&self, id: &str) -> Result<Vec<(String, RestoreAction)>> {
        let commit_id = CommitId::parse(id).map_err(|_| Error::commit_not_found(id))?;

        if !self.log.exists(commit_id.as_str())? || !self.commits.contains(&commit_id) {
            return Err(Error::commit_not_found(id));
        }

        let tracked = self.index.list()?;
        let actions = self.commits.restore(&commit_id, &self.work_dir, &tracked)?;

        info!(id = %commit_id, files = actions.len(), "switched to commit");
        Ok(actions)
    }

    /// Log lines for display, newest first.
    pub fn log_lines(&self) -> Result<impl Iterator<Item = String>> {
        self.log.lines_newest_first()
    }

    /// Parsed commits, newest first.
    pub fn commits(&self) -> Result<Vec<Commit>> {
        let mut commits = self.log.records()?;
        commits.reverse();
        Ok(commits)
    }
}
