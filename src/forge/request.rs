use serde::Serialize;

/// JSON body of a create-pull-request call. Exactly these three fields are
/// sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSpec {
    pub head: String,
    pub base: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to open a pull request in `owner/repo`.
pub struct CreatePrRequest {
    pub owner: String,
    pub repo: String,
    pub spec: PullRequestSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw API response. The body is kept verbatim and never parsed.
pub struct PullRequestResponse {
    pub status: u16,
    pub body: String,
}

impl PullRequestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
