//! Error types for the agenda workflow.
//!
//! Every failure is reported as an [`AgendaError`]. Each variant belongs to
//! exactly one workflow [`Step`], which lets the top-level handler name the
//! step that halted the run.

use chrono::NaiveDate;
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Ordered steps of a publishing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Configure,
    Clone,
    Branch,
    Write,
    Commit,
    Push,
    OpenPr,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Configure => "configure",
            Step::Clone => "clone",
            Step::Branch => "branch",
            Step::Write => "write",
            Step::Commit => "commit",
            Step::Push => "push",
            Step::OpenPr => "open-pr",
        };
        f.write_str(name)
    }
}

/// Main error type for agenda publishing.
#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("no wednesday found on or after {0}")]
    DateOutOfRange(NaiveDate),

    #[error("could not prepare working directory {path}: {source}")]
    Workdir { path: PathBuf, source: io::Error },

    #[error("error cloning repo {url}: {source}")]
    Clone { url: String, source: git2::Error },

    #[error("repository has no working directory")]
    BareRepository,

    #[error("branch {0} already exists")]
    BranchExists(String),

    #[error("could not checkout branch {branch}: {source}")]
    Checkout { branch: String, source: git2::Error },

    #[error("could not create file {path}: {source}")]
    WriteFile { path: PathBuf, source: io::Error },

    #[error("could not add file {path}: {source}")]
    Stage { path: PathBuf, source: git2::Error },

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("could not commit: {0}")]
    Commit(#[source] git2::Error),

    #[error("could not push to {remote}: {source}")]
    Push { remote: String, source: git2::Error },

    #[error("remote rejected {reference}: {message}")]
    PushRejected { reference: String, message: String },

    #[error("invalid pull request api url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("pr api request was not successful: {0}")]
    PullRequest(#[from] reqwest::Error),
}

/// Result type alias using AgendaError
pub type Result<T> = std::result::Result<T, AgendaError>;

impl AgendaError {
    /// Workflow step this error halts.
    pub fn step(&self) -> Step {
        match self {
            Self::DateOutOfRange(_) => Step::Configure,
            Self::Workdir { .. } | Self::Clone { .. } => Step::Clone,
            Self::BareRepository
            | Self::BranchExists(_)
            | Self::Checkout { .. } => Step::Branch,
            Self::WriteFile { .. } => Step::Write,
            Self::Stage { .. } | Self::NothingToCommit | Self::Commit(_) => {
                Step::Commit
            }
            Self::Push { .. } | Self::PushRejected { .. } => Step::Push,
            Self::InvalidUrl(_)
            | Self::Serialize(_)
            | Self::PullRequest(_) => Step::OpenPr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = AgendaError::BranchExists("01-03".into());
        assert_eq!(err.to_string(), "branch 01-03 already exists");

        let err = AgendaError::PushRejected {
            reference: "refs/heads/01-03".into(),
            message: "non-fast-forward".into(),
        };
        assert_eq!(
            err.to_string(),
            "remote rejected refs/heads/01-03: non-fast-forward"
        );
    }

    #[test]
    fn test_errors_map_to_steps() {
        let err = AgendaError::Clone {
            url: "https://github.com/org/repo.git".into(),
            source: git2::Error::from_str("network unreachable"),
        };
        assert_eq!(err.step(), Step::Clone);
        assert!(err.to_string().contains("network unreachable"));

        assert_eq!(AgendaError::BranchExists("x".into()).step(), Step::Branch);
        assert_eq!(AgendaError::NothingToCommit.step(), Step::Commit);

        let err = AgendaError::WriteFile {
            path: "/tmp/repo/01-03.md".into(),
            source: io::Error::other("disk full"),
        };
        assert_eq!(err.step(), Step::Write);

        let err: AgendaError = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(err.step(), Step::OpenPr);
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::OpenPr.to_string(), "open-pr");
        assert_eq!(Step::Clone.to_string(), "clone");
    }
}
