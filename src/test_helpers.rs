//! Common test helper functions shared across test modules.
use chrono::NaiveDate;
use secrecy::SecretString;
use std::path::{Path, PathBuf};

use crate::config::{
    AgendaDate, Credentials, DEFAULT_API_BASE_URL, DEFAULT_GIT_BASE_URL,
    RunConfig,
};

/// Creates a RunConfig for an agenda on Wednesday 2024-01-03.
pub fn create_test_run_config(workdir: PathBuf) -> RunConfig {
    let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    RunConfig {
        agenda: AgendaDate::on_or_after(monday).unwrap(),
        organization: "coflnet".to_string(),
        repo: "agenda".to_string(),
        pr_base: "main".to_string(),
        workdir,
        git_base_url: DEFAULT_GIT_BASE_URL.to_string(),
        api_base_url: DEFAULT_API_BASE_URL.to_string(),
        pr_username: "pr-bot".to_string(),
        credentials: Credentials {
            username: "coflnet-bot".to_string(),
            token: SecretString::from("test-token".to_string()),
        },
        clean_workdir: false,
    }
}

/// `file://` URL for a local path.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Creates a bare repository at `{root}/coflnet/agenda.git` holding a single
/// commit on `main`, with each of `branches` pointing at that commit.
pub fn create_bare_remote(root: &Path, branches: &[&str]) -> PathBuf {
    let path = root.join("coflnet").join("agenda.git");
    let repo = git2::Repository::init_bare(&path).unwrap();

    let blob = repo.blob(b"# Agendas\n").unwrap();
    let mut builder = repo.treebuilder(None).unwrap();
    builder.insert("README.md", blob, 0o100644).unwrap();
    let tree_id = builder.write().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = git2::Signature::now("seed", "seed@example.com").unwrap();
    let commit_id = repo
        .commit(Some("refs/heads/main"), &sig, &sig, "init", &tree, &[])
        .unwrap();
    repo.set_head("refs/heads/main").unwrap();

    let commit = repo.find_commit(commit_id).unwrap();
    for branch in branches {
        repo.branch(branch, &commit, false).unwrap();
    }

    path
}
