//! Implements the PullRequestOpener trait for Github
use async_trait::async_trait;
use log::*;
use reqwest::{
    Client, Url,
    header::{ACCEPT, CONTENT_TYPE},
};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    error::Result,
    forge::{
        request::{CreatePrRequest, PullRequestResponse},
        traits::PullRequestOpener,
    },
};

/// Media type requested from the GitHub REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

const USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client authenticating with basic auth (username, token).
pub struct Github {
    base_url: Url,
    client: Client,
    username: String,
    token: SecretString,
}

impl Github {
    pub fn new(
        api_base_url: &str,
        username: impl Into<String>,
        token: SecretString,
    ) -> Result<Self> {
        // keep the trailing slash so join appends instead of replacing
        let mut base = api_base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            base_url,
            client,
            username: username.into(),
            token,
        })
    }

    /// `{base}/repos/{owner}/{repo}/pulls`
    pub fn pulls_url(&self, owner: &str, repo: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("repos/{owner}/{repo}/pulls"))?)
    }
}

#[async_trait]
impl PullRequestOpener for Github {
    async fn open_pull_request(
        &self,
        req: CreatePrRequest,
    ) -> Result<PullRequestResponse> {
        let url = self.pulls_url(&req.owner, &req.repo)?;
        info!("url: {url}");
        debug!("authenticating as {}", self.username);

        let body = serde_json::to_vec(&req.spec)?;

        let request = self
            .client
            .post(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(&self.username, Some(self.token.expose_secret()))
            .body(body)
            .build()?;

        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(PullRequestResponse { status, body })
    }
}
