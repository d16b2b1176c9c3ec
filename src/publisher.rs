//! The agenda publishing workflow.
//!
//! A run is a strict sequence: clone, branch, write, commit, push, open pr.
//! The first failing step ends the run and its error is returned to the
//! caller. Completed steps are never rolled back, so a cloned working
//! directory or a pushed branch survives a later failure.
use log::*;
use std::path::Path;

use crate::{
    agenda::write_agenda,
    config::RunConfig,
    error::Result,
    forge::{
        request::{CreatePrRequest, PullRequestResponse, PullRequestSpec},
        traits::PullRequestOpener,
    },
    repo::{CloneRequest, Identity, RepositoryCloner, WorkingRepository},
};

/// Drives one publishing run against the given collaborators.
pub struct AgendaPublisher<'a> {
    config: &'a RunConfig,
    cloner: &'a dyn RepositoryCloner,
    forge: &'a dyn PullRequestOpener,
}

impl<'a> AgendaPublisher<'a> {
    pub fn new(
        config: &'a RunConfig,
        cloner: &'a dyn RepositoryCloner,
        forge: &'a dyn PullRequestOpener,
    ) -> Self {
        Self {
            config,
            cloner,
            forge,
        }
    }

    /// Execute every step in order. A non-2xx pull request response is
    /// logged and returned, not treated as a failure.
    pub async fn run(&self) -> Result<PullRequestResponse> {
        info!("cloning repo");
        let repo = self.clone_repo()?;

        info!("create branch");
        self.create_branch(repo.as_ref())?;

        info!("add new agenda");
        self.write_file(repo.as_ref())?;

        info!("commit agenda");
        self.commit(repo.as_ref())?;

        info!("push new branch");
        repo.push()?;
        drop(repo);

        info!("create pr");
        self.open_pr().await
    }

    fn clone_repo(&self) -> Result<Box<dyn WorkingRepository>> {
        self.cloner.clone_repo(&CloneRequest {
            url: self.config.clone_url(),
            path: self.config.workdir.clone(),
            credentials: self.config.credentials.clone(),
            clean: self.config.clean_workdir,
        })
    }

    fn create_branch(&self, repo: &dyn WorkingRepository) -> Result<()> {
        repo.checkout_new_branch(&self.config.branch_name())
    }

    fn write_file(&self, repo: &dyn WorkingRepository) -> Result<()> {
        let workdir = repo.workdir()?;
        let path = write_agenda(&workdir, &self.config.file_name())?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    fn commit(&self, repo: &dyn WorkingRepository) -> Result<()> {
        let file_name = self.config.file_name();
        repo.stage(Path::new(&file_name))?;
        let id = repo.commit(&self.config.commit_message(), &Identity::bot())?;
        info!("created commit {id}");
        Ok(())
    }

    async fn open_pr(&self) -> Result<PullRequestResponse> {
        let branch = self.config.branch_name();
        let req = CreatePrRequest {
            owner: self.config.organization.clone(),
            repo: self.config.repo.clone(),
            spec: PullRequestSpec {
                title: self.config.pr_title(),
                head: branch,
                base: self.config.pr_base.clone(),
            },
        };

        let response = self.forge.open_pull_request(req).await?;

        for (level, line) in response_log(&response) {
            log!(level, "{line}");
        }

        Ok(response)
    }
}

/// Log lines for a pull request response: status, a warning for non-2xx,
/// then the body verbatim.
fn response_log(response: &PullRequestResponse) -> Vec<(Level, String)> {
    let mut lines =
        vec![(Level::Info, format!("response Status: {}", response.status))];
    if !response.is_success() {
        lines.push((
            Level::Warn,
            format!("pull request api answered with status {}", response.status),
        ));
    }
    lines.push((Level::Info, format!("response Body: {}", response.body)));
    lines
}
