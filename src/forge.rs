//! Pull request API access for the agenda repository's forge.

/// GitHub REST API client.
pub mod github;

/// Request and response types exchanged with the forge.
pub mod request;

/// Trait the publisher uses to open pull requests.
pub mod traits;
