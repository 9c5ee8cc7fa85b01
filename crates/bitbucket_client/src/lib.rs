//! Crate for interacting with the Bitbucket Cloud REST API.
//!
//! This crate provides a client for making authenticated requests against the
//! branch-restrictions resource of a repository, authenticating with a
//! username and app password over HTTP Basic auth.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

pub mod errors;
pub use errors::Error;

pub mod branch_restriction;
pub mod models;

pub use branch_restriction::{
    BranchMatchKind, BranchRestriction, BranchRestrictionPayload, GroupRef, UserRef,
};
pub use models::{Credential, RepositoryRef};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Base URL of the Bitbucket Cloud v2 API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.bitbucket.org/2.0";

/// Per-request timeout. Requests that exceed it fail with a transport error;
/// the client never retries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for branch-restriction operations against a repository collection.
///
/// This is the seam consumed by the sync orchestration so the upsert loop can
/// be exercised against a test double.
#[async_trait]
pub trait BranchRestrictionApi: Send + Sync {
    /// Creates a new branch restriction on the repository's collection
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] when an equivalent restriction already
    /// exists, [`Error::Remote`] for any other rejection, and
    /// [`Error::Transport`] when the request never completed.
    async fn create_branch_restriction(
        &self,
        repo: &RepositoryRef,
        payload: &BranchRestrictionPayload,
    ) -> Result<BranchRestriction, Error>;

    /// Overwrites the branch restriction with the given id on the
    /// repository's member endpoint.
    ///
    /// # Errors
    ///
    /// Any non-success status is an error; a conflict on update is not
    /// resolvable and is reported like any other rejection.
    async fn update_branch_restriction(
        &self,
        repo: &RepositoryRef,
        id: u64,
        payload: &BranchRestrictionPayload,
    ) -> Result<BranchRestriction, Error>;
}

/// A client for the Bitbucket Cloud branch-restrictions API, authenticated
/// with a username and app password.
///
/// The `Authorization` header is computed once at construction and attached
/// to every request; requests use HTTP/1.1 framing, require TLS 1.3, and
/// carry a fixed 30-second timeout.
#[derive(Clone, Debug)]
pub struct BitbucketClient {
    http: reqwest::Client,
    base_url: String,
}

impl BitbucketClient {
    /// Creates a client against the production Bitbucket Cloud API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if the credential cannot be
    /// encoded into a header value, or [`Error::Transport`] if the underlying
    /// HTTP client cannot be constructed.
    pub fn new(credential: &Credential) -> Result<Self, Error> {
        Self::with_base_url(credential, DEFAULT_API_BASE_URL)
    }

    /// Creates a client against an alternative API base URL.
    ///
    /// Intended for tests that point the client at a local mock server; the
    /// production entry point is [`BitbucketClient::new`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::BaseUrl`] if `base_url` is not a valid absolute URL,
    /// plus the construction errors of [`BitbucketClient::new`].
    pub fn with_base_url(credential: &Credential, base_url: &str) -> Result<Self, Error> {
        let base_url = base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::AUTHORIZATION, basic_auth_header(credential)?);

        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_3)
            .http1_only()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    fn collection_url(&self, repo: &RepositoryRef) -> String {
        format!(
            "{}/repositories/{}/{}/branch-restrictions",
            self.base_url, repo.owner, repo.slug
        )
    }

    async fn send_restriction(
        &self,
        method: Method,
        url: String,
        payload: &BranchRestrictionPayload,
    ) -> Result<BranchRestriction, Error> {
        let response = self
            .http
            .request(method, &url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(serde_json::from_str(&body)?),
            StatusCode::CONFLICT => {
                let existing_id = extract_conflict_id(&body);
                warn!(
                    url = %url,
                    existing_id = ?existing_id,
                    "Branch restriction already exists on the remote"
                );
                Err(Error::Conflict { existing_id, body })
            }
            _ => {
                error!(
                    url = %url,
                    status = status.as_u16(),
                    body = %body,
                    "Bitbucket rejected the branch restriction request"
                );
                Err(Error::Remote {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl BranchRestrictionApi for BitbucketClient {
    #[instrument(skip(self, payload), fields(owner = %repo.owner, repo = %repo.slug, kind = payload.kind()))]
    async fn create_branch_restriction(
        &self,
        repo: &RepositoryRef,
        payload: &BranchRestrictionPayload,
    ) -> Result<BranchRestriction, Error> {
        info!(pattern = payload.pattern(), "Creating branch restriction");

        let restriction = self
            .send_restriction(Method::POST, self.collection_url(repo), payload)
            .await?;

        info!(id = restriction.id, "Branch restriction created");
        Ok(restriction)
    }

    #[instrument(skip(self, payload), fields(owner = %repo.owner, repo = %repo.slug, kind = payload.kind()))]
    async fn update_branch_restriction(
        &self,
        repo: &RepositoryRef,
        id: u64,
        payload: &BranchRestrictionPayload,
    ) -> Result<BranchRestriction, Error> {
        info!(id = id, pattern = payload.pattern(), "Overwriting branch restriction");

        let url = format!("{}/{}", self.collection_url(repo), id);
        let restriction = self.send_restriction(Method::PUT, url, payload).await?;

        info!(id = restriction.id, "Branch restriction overwritten");
        Ok(restriction)
    }
}

/// Computes the `Basic base64(username:app_password)` header value, marked
/// sensitive so it is never printed by the HTTP stack.
///
/// A username containing `:` would be indistinguishable from the password
/// separator inside the encoded pair, so it is rejected up front.
fn basic_auth_header(credential: &Credential) -> Result<HeaderValue, Error> {
    if credential.username.contains(':') || credential.username.chars().any(char::is_control) {
        return Err(Error::InvalidCredential(
            "username must not contain ':' or control characters".to_string(),
        ));
    }

    let token = BASE64.encode(format!(
        "{}:{}",
        credential.username,
        credential.app_password.expose_secret()
    ));

    let mut value = HeaderValue::from_str(&format!("Basic {token}")).map_err(|_| {
        Error::InvalidCredential(
            "credential contains characters that cannot appear in a header value".to_string(),
        )
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Recovers the existing restriction id from a 409 response body.
///
/// Bitbucket's conflict message embeds the id as `...(id=NNN)"...`; the id is
/// the digit run between the literal `id=` marker and the following `)"`.
/// This matches the message format byte-for-byte rather than parsing the
/// error JSON, preserving compatibility with the current wire format. Any
/// deviation yields `None`.
fn extract_conflict_id(body: &str) -> Option<u64> {
    let start = body.find("id=")? + "id=".len();
    let rest = &body[start..];
    let end = rest.find(")\"")?;
    rest[..end].parse().ok()
}
