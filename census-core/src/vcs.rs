//! Last-commit lookup using git2

use crate::error::{ScanError, ScanResult};
use chrono::DateTime;
use git2::{ErrorCode, Repository};
use std::path::Path;
use tracing::debug;

/// Summary of the most recent commit of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit date, `YYYY-MM-DD` in UTC
    pub date: String,
    /// Author email, or name when the email is missing
    pub author: String,
    /// Trimmed commit message
    pub message: String,
}

/// Source of commit metadata for a folder
pub trait CommitSource {
    /// Fails with `NotARepository` when `path` is not a repository root
    fn last_commit(&self, path: &Path) -> ScanResult<CommitInfo>;
}

/// Opens the folder itself as a repository and follows `HEAD`
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCommitSource;

impl GitCommitSource {
    pub fn new() -> Self {
        Self
    }
}

impl CommitSource for GitCommitSource {
    fn last_commit(&self, path: &Path) -> ScanResult<CommitInfo> {
        let vcs_error = |e: git2::Error| ScanError::Vcs { path: path.to_path_buf(), message: e.message().to_string() };

        let repo = Repository::open(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => ScanError::NotARepository { path: path.to_path_buf() },
            _ => vcs_error(e),
        })?;

        let head = repo.head().map_err(vcs_error)?;
        let commit = head.peel_to_commit().map_err(vcs_error)?;

        let date = DateTime::from_timestamp(commit.time().seconds(), 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let author = commit.author();
        let author = author.email().or_else(|| author.name()).unwrap_or("unknown").to_string();
        let message = commit.message().unwrap_or("").trim().to_string();

        debug!("Last commit of {:?}: {} by {}", path, date, author);
        Ok(CommitInfo { date, author, message })
    }
}
