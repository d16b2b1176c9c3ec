//! Git repository operations for the agenda workflow.
//!
//! Everything goes through libgit2 via the `git2` crate:
//!
//! - Full clone over HTTPS with username/token authentication
//! - Creating and checking out the dated agenda branch
//! - Staging a single file and committing it as the bot identity
//! - Pushing every local branch back to `origin`
//!
//! Clone and push progress reported by the remote is streamed to stdout.
//!
//! The workflow only talks to the [`RepositoryCloner`] and
//! [`WorkingRepository`] traits so the publisher can be exercised without a
//! remote.
use git2::{BranchType, Cred, RemoteCallbacks, build::CheckoutBuilder};
use log::*;
use secrecy::ExposeSecret;
use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[cfg(test)]
use mockall::automock;

use crate::{
    config::Credentials,
    error::{AgendaError, Result},
};

/// Remote name created by the clone.
pub const DEFAULT_REMOTE: &str = "origin";
/// Name used for author and committer of agenda commits.
pub const BOT_NAME: &str = "coflnet-bot";
/// Email used for author and committer of agenda commits.
pub const BOT_EMAIL: &str = "ci@coflnet.com";

/// Author/committer identity for a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn bot() -> Self {
        Self {
            name: BOT_NAME.to_string(),
            email: BOT_EMAIL.to_string(),
        }
    }
}

/// Request to clone a remote repository into a local directory.
#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub url: String,
    pub path: PathBuf,
    pub credentials: Credentials,
    /// Remove `path` first if it already exists.
    pub clean: bool,
}

/// Produces a local working repository from a remote.
#[cfg_attr(test, automock)]
pub trait RepositoryCloner {
    fn clone_repo(
        &self,
        req: &CloneRequest,
    ) -> Result<Box<dyn WorkingRepository>>;
}

/// A cloned repository with a mutable worktree.
#[cfg_attr(test, automock)]
pub trait WorkingRepository {
    /// Root of the worktree.
    fn workdir(&self) -> Result<PathBuf>;
    /// Create `branch` from HEAD and check it out. Fails if the branch
    /// already exists locally or on the remote.
    fn checkout_new_branch(&self, branch: &str) -> Result<()>;
    /// Stage a single path relative to the worktree root.
    fn stage(&self, path: &Path) -> Result<()>;
    /// Commit the index onto HEAD, returning the new commit id.
    fn commit(&self, msg: &str, identity: &Identity) -> Result<String>;
    /// Push every local branch to the remote branch of the same name.
    fn push(&self) -> Result<()>;
}

/// Create callbacks for username/token authentication and progress output.
///
/// libgit2 asks for credentials again whenever the server rejects them, so
/// only a single attempt is answered; the next request aborts the transfer
/// instead of looping.
fn get_callbacks<'r>(credentials: &Credentials) -> RemoteCallbacks<'r> {
    let user = credentials.username.clone();
    let token = credentials.token.clone();
    let mut attempted = false;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        if attempted {
            return Err(git2::Error::from_str(
                "authentication failed for configured credentials",
            ));
        }
        attempted = true;
        Cred::userpass_plaintext(&user, token.expose_secret())
    });
    callbacks.sideband_progress(|data| {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(data);
        let _ = stdout.flush();
        true
    });
    callbacks.transfer_progress(|stats| {
        if stats.total_objects() > 0
            && stats.received_objects() == stats.total_objects()
            && stats.indexed_deltas() == stats.total_deltas()
        {
            println!(
                "Received {} objects ({} bytes), resolved {} deltas",
                stats.received_objects(),
                stats.received_bytes(),
                stats.indexed_deltas()
            );
        }
        true
    });
    callbacks
}

/// Clones repositories with libgit2.
#[derive(Debug, Default)]
pub struct GitCloner;

impl RepositoryCloner for GitCloner {
    fn clone_repo(
        &self,
        req: &CloneRequest,
    ) -> Result<Box<dyn WorkingRepository>> {
        let repo = GitRepository::clone_remote(req)?;
        Ok(Box::new(repo))
    }
}

/// Working repository backed by `git2::Repository`.
pub struct GitRepository {
    credentials: Credentials,
    repo: git2::Repository,
}

impl GitRepository {
    /// Performs a full clone of a remote repository.
    ///
    /// # Arguments
    ///
    /// * `req` - Remote URL, target directory, credentials and whether an
    ///   existing target directory is removed first
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The cloned repository with its worktree checked out
    ///   at the remote's default branch
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `req.clean` is set and the existing directory cannot be removed
    /// - The target directory exists and is not empty
    /// - The remote is unreachable or rejects the credentials
    ///
    /// # Authentication
    ///
    /// Credentials are answered once. A second credential request from
    /// libgit2 aborts the clone.
    pub fn clone_remote(req: &CloneRequest) -> Result<Self> {
        if req.clean && req.path.exists() {
            info!("removing existing working directory {}", req.path.display());
            fs::remove_dir_all(&req.path).map_err(|source| {
                AgendaError::Workdir {
                    path: req.path.clone(),
                    source,
                }
            })?;
        }

        info!("cloning {} into {}", req.url, req.path.display());

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(get_callbacks(&req.credentials));

        let repo = git2::build::RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(&req.url, &req.path)
            .map_err(|source| AgendaError::Clone {
                url: req.url.clone(),
                source,
            })?;

        Ok(Self {
            credentials: req.credentials.clone(),
            repo,
        })
    }

    fn local_branch_refspecs(
        &self,
    ) -> std::result::Result<Vec<String>, git2::Error> {
        let mut ref_specs = vec![];
        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                ref_specs
                    .push(format!("refs/heads/{name}:refs/heads/{name}"));
            }
        }
        Ok(ref_specs)
    }

    fn branch_exists(&self, branch: &str) -> bool {
        let remote_branch = format!("{DEFAULT_REMOTE}/{branch}");
        self.repo.find_branch(branch, BranchType::Local).is_ok()
            || self
                .repo
                .find_branch(&remote_branch, BranchType::Remote)
                .is_ok()
    }
}

impl WorkingRepository for GitRepository {
    fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or(AgendaError::BareRepository)
    }

    /// Creates a branch at HEAD and checks it out.
    ///
    /// # Arguments
    ///
    /// * `branch` - Name of the branch to create
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `branch` exists locally or as `origin/{branch}`
    /// - HEAD does not point at a commit
    /// - The checkout would overwrite local changes
    ///
    /// # Safe Creation
    ///
    /// The branch is created without force and checked out in safe mode, so
    /// neither an existing branch nor uncommitted work is ever overwritten.
    fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        if self.branch_exists(branch) {
            return Err(AgendaError::BranchExists(branch.to_string()));
        }

        info!("creating branch: {branch}");
        let to_error = |source| AgendaError::Checkout {
            branch: branch.to_string(),
            source,
        };

        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(to_error)?;
        self.repo.branch(branch, &commit, false).map_err(to_error)?;

        let ref_name = format!("refs/heads/{branch}");
        let target = self.repo.revparse_single(&ref_name).map_err(to_error)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(&target, Some(&mut checkout))
            .map_err(to_error)?;
        self.repo.set_head(&ref_name).map_err(to_error)?;

        Ok(())
    }

    fn stage(&self, path: &Path) -> Result<()> {
        debug!("adding {} to index", path.display());
        let to_error = |source| AgendaError::Stage {
            path: path.to_path_buf(),
            source,
        };
        let mut index = self.repo.index().map_err(to_error)?;
        index.add_path(path).map_err(to_error)?;
        index.write().map_err(to_error)?;
        Ok(())
    }

    /// Commits the current index on top of HEAD.
    ///
    /// # Arguments
    ///
    /// * `msg` - Commit message
    /// * `identity` - Name and email used for both author and committer
    ///
    /// # Returns
    ///
    /// * `Result<String>` - Hex id of the new commit
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The staged tree is identical to HEAD's tree (`NothingToCommit`)
    /// - HEAD does not point at a commit
    /// - The index or object database cannot be written
    fn commit(&self, msg: &str, identity: &Identity) -> Result<String> {
        debug!("committing changes with msg: {msg}");
        let mut index = self.repo.index().map_err(AgendaError::Commit)?;
        let tree_id = index.write_tree().map_err(AgendaError::Commit)?;
        let tree = self.repo.find_tree(tree_id).map_err(AgendaError::Commit)?;
        let parent = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(AgendaError::Commit)?;

        if parent.tree_id() == tree_id {
            return Err(AgendaError::NothingToCommit);
        }

        // author and committer each get their own timestamp
        let author = git2::Signature::now(&identity.name, &identity.email)
            .map_err(AgendaError::Commit)?;
        let committer = git2::Signature::now(&identity.name, &identity.email)
            .map_err(AgendaError::Commit)?;

        let oid = self
            .repo
            .commit(Some("HEAD"), &author, &committer, msg, &tree, &[&parent])
            .map_err(AgendaError::Commit)?;

        Ok(oid.to_string())
    }

    /// Pushes all local branches to [`DEFAULT_REMOTE`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The remote is unreachable or rejects the credentials
    ///   ([`AgendaError::Push`])
    /// - The remote refuses any reference ([`AgendaError::PushRejected`])
    ///
    /// # Refspecs
    ///
    /// Each local branch `name` is sent as
    /// `refs/heads/{name}:refs/heads/{name}` without force. A branch that
    /// moved on the remote since the clone is therefore rejected instead of
    /// overwritten.
    ///
    /// # Authentication
    ///
    /// Uses the same username/token as the clone.
    fn push(&self) -> Result<()> {
        let to_error = |source| AgendaError::Push {
            remote: DEFAULT_REMOTE.to_string(),
            source,
        };

        let ref_specs = self.local_branch_refspecs().map_err(to_error)?;
        info!("pushing {} branches to {DEFAULT_REMOTE}", ref_specs.len());
        debug!("push refspecs: {ref_specs:?}");

        // the remote reports per-ref rejections through this callback
        // rather than failing the push itself
        let rejection: RefCell<Option<(String, String)>> = RefCell::new(None);

        let mut callbacks = get_callbacks(&self.credentials);
        callbacks.push_update_reference(|reference, status| {
            if let Some(message) = status {
                *rejection.borrow_mut() =
                    Some((reference.to_string(), message.to_string()));
            }
            Ok(())
        });

        let mut push_opts = git2::PushOptions::new();
        push_opts.remote_callbacks(callbacks);

        let mut remote =
            self.repo.find_remote(DEFAULT_REMOTE).map_err(to_error)?;
        remote
            .push(&ref_specs, Some(&mut push_opts))
            .map_err(to_error)?;

        if let Some((reference, message)) = rejection.borrow_mut().take() {
            return Err(AgendaError::PushRejected { reference, message });
        }

        Ok(())
    }
}
