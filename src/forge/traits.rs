//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    error::Result,
    forge::request::{CreatePrRequest, PullRequestResponse},
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PullRequestOpener: Send + Sync {
    /// Issue the create request. Only transport failures are errors; an API
    /// level rejection comes back as a non-2xx response.
    async fn open_pull_request(
        &self,
        req: CreatePrRequest,
    ) -> Result<PullRequestResponse>;
}
