//! # SVCS Core
//!
//! A minimal version control engine: track files, record snapshots of them
//! as commits, and restore the working directory to any earlier commit.
//!
//! History is linear. A commit is identified by the SHA-256 of the tracked
//! files' contents followed by a timestamp suffix, and is only recorded when
//! that content differs from the previous commit.
//!
//! ## Features
//!
//! - Index of tracked file names, kept in insertion order
//! - Content-based change detection
//! - Append-only, human-readable commit log
//! - Per-commit snapshot directories, written through staging directories
//! - Checkout that also removes files absent from the target commit
//!
//! ## Example
//!
//! ```no_run
//! use svcs_core::{CommitOutcome, Repository};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::open("./vcs", ".")?;
//!
//! repo.configure(Some("Alice"), || unreachable!())?;
//! repo.add(Path::new("notes.txt"))?;
//!
//! if let CommitOutcome::Committed { commit, .. } = repo.commit("first")? {
//!     // ... edit notes.txt, then go back
//!     repo.checkout(commit.id.as_str())?;
//! }
//! # Ok(())
//! # }
//! ```

mod commit;
mod config;
mod error;
mod fsutil;
mod hash;
mod index;
mod log;
mod repo;
mod snapshot;

pub use commit::{Commit, CommitId};
pub use config::UserConfig;
pub use error::{Error, Result};
pub use hash::{ContentHash, HASH_HEX_LEN, HASH_SIZE};
pub use index::{AddOutcome, Index};
pub use log::CommitLog;
pub use repo::{CommitOutcome, Repository};
pub use snapshot::{CommitStore, RestoreAction};
