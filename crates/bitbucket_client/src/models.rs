//! Bitbucket Cloud domain types shared across client operations.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Identifies a repository on Bitbucket Cloud.
///
/// The `owner` is the workspace (or user) the repository lives under and the
/// `slug` is the URL-safe repository name. Both are fixed for the duration of
/// a sync run.
///
/// # Examples
///
/// ```rust
/// use bitbucket_client::RepositoryRef;
///
/// let repo = RepositoryRef::new("acme", "widgets");
/// assert_eq!(repo.to_string(), "acme/widgets");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Workspace or user owning the repository
    pub owner: String,

    /// URL-safe repository name
    pub slug: String,
}

impl RepositoryRef {
    /// Creates a new repository reference.
    pub fn new(owner: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            slug: slug.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.slug)
    }
}

/// Basic-auth credential for the Bitbucket Cloud API.
///
/// The app password is held behind [`SecretString`] so it is redacted from
/// `Debug` output and never logged. Its only consumer is the `Authorization`
/// header computed once at client construction; the credential itself is
/// never persisted.
#[derive(Debug)]
pub struct Credential {
    /// Bitbucket username the app password belongs to
    pub username: String,

    /// Bitbucket app password
    pub app_password: SecretString,
}

impl Credential {
    /// Creates a new credential.
    pub fn new(username: impl Into<String>, app_password: SecretString) -> Self {
        Self {
            username: username.into(),
            app_password,
        }
    }
}
