//! Error types for Bitbucket client operations.
//!
//! This module defines the error types that can occur when interacting with
//! the Bitbucket Cloud API through the bitbucket_client crate.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during Bitbucket client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use bitbucket_client::Error;
///
/// match client.create_branch_restriction(&repo, &payload).await {
///     Ok(restriction) => println!("Created restriction {}", restriction.id),
///     Err(Error::Conflict { existing_id: Some(id), .. }) => {
///         println!("Restriction already exists as {id}")
///     }
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured API base URL is not a valid absolute URL.
    #[error("Invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The remote reported that an equivalent restriction already exists.
    ///
    /// Bitbucket answers a duplicate `(kind, pattern)` create with
    /// `409 Conflict`; the existing restriction's numeric id is recovered
    /// from the response body when the body carries it in the expected
    /// format, otherwise `existing_id` is `None` and the conflict cannot be
    /// resolved by an update.
    #[error("Branch restriction already exists on the remote (existing id: {existing_id:?})")]
    Conflict {
        /// Id of the already-existing restriction, when recoverable
        existing_id: Option<u64>,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// Error deserializing a response from Bitbucket.
    ///
    /// A success status arrived but the body does not match the expected
    /// resource shape. This may indicate API changes or a corrupted
    /// response.
    #[error("Failed to deserialize Bitbucket response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The credential cannot be encoded into an `Authorization` header.
    ///
    /// Usernames and app passwords containing control characters cannot
    /// appear in an HTTP header value.
    #[error("Failed to construct the Authorization header: {0}")]
    InvalidCredential(String),

    /// Bitbucket answered with a status outside the expected set.
    ///
    /// Anything other than a success or a conflict is a rejection; the
    /// response body is carried for logging. The client never retries.
    #[error("Bitbucket rejected the request with status {status}: {body}")]
    Remote {
        /// HTTP status code of the response
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Network, timeout, or TLS failure while talking to Bitbucket.
    #[error("Failed to reach Bitbucket: {0}")]
    Transport(#[from] reqwest::Error),
}
