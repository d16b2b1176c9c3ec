//! CLI argument parsing. Every option falls back to an environment variable
//! so the bot runs unattended with no flags at all.
use chrono::NaiveDate;
use clap::Parser;
use secrecy::SecretString;
use std::path::{Path, PathBuf};

use crate::{
    config::{
        AgendaDate, Credentials, DEFAULT_API_BASE_URL, DEFAULT_GIT_BASE_URL,
        DEFAULT_WORKDIR, RunConfig,
    },
    error::Result,
};

/// Opens the weekly agenda pull request.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, env = "GIT_ORGANIZATION", default_value = "")]
    /// Organization (or user) owning the agenda repository.
    pub organization: String,

    #[arg(long, env = "GIT_REPO", default_value = "")]
    /// Agenda repository name.
    pub repo: String,

    #[arg(long, env = "GIT_HEAD", default_value = "")]
    /// Branch the pull request is opened against.
    pub pr_base: String,

    #[arg(long, env = "GIT_USERNAME", default_value = "")]
    /// Username for git transport authentication.
    pub username: String,

    #[arg(
        long,
        env = "GIT_TOKEN",
        default_value = "",
        hide_env_values = true,
        value_parser = parse_secret
    )]
    /// Access token used for git transport and the pull request API.
    pub token: SecretString,

    #[arg(long, env = "GIT_PR_USERNAME")]
    /// Username for the pull request API. Defaults to the git username.
    pub pr_username: Option<String>,

    #[arg(long, env = "AGENDA_WORKDIR", default_value = DEFAULT_WORKDIR)]
    /// Local directory the repository is cloned into.
    pub workdir: PathBuf,

    #[arg(long, env = "AGENDA_GIT_BASE_URL", default_value = DEFAULT_GIT_BASE_URL)]
    /// Base URL the repository is cloned from.
    pub git_base_url: String,

    #[arg(long, env = "AGENDA_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    /// Base URL of the pull request API.
    pub api_base_url: String,

    #[arg(long, env = "AGENDA_CLEAN", default_value_t = false)]
    /// Remove an existing working directory before cloning.
    pub clean: bool,

    #[arg(long, env = "AGENDA_DEBUG", default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

/// Load `{dir}/.env` into the process environment, if present.
///
/// Variables that are already set keep their value, so the real environment
/// and flags always win over the file. Returns the loaded path.
pub fn load_dotenv(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(".env");
    dotenvy::from_path(&path).ok().map(|_| path)
}

fn parse_secret(value: &str) -> std::result::Result<SecretString, String> {
    Ok(SecretString::from(value.to_string()))
}

impl Args {
    /// Resolve the immutable run configuration for an agenda prepared on
    /// `today`. Missing values are not validated; they fail downstream.
    pub fn into_run_config(self, today: NaiveDate) -> Result<RunConfig> {
        let agenda = AgendaDate::on_or_after(today)?;

        let pr_username = self
            .pr_username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.username.clone());

        Ok(RunConfig {
            agenda,
            organization: self.organization,
            repo: self.repo,
            pr_base: self.pr_base,
            workdir: self.workdir,
            git_base_url: self.git_base_url,
            api_base_url: self.api_base_url,
            pr_username,
            credentials: Credentials {
                username: self.username,
                token: self.token,
            },
            clean_workdir: self.clean,
        })
    }
}
