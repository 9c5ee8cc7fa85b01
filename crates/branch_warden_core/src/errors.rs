//! Error types for the sync workflow.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised while preparing a sync run.
///
/// Failures of individual rule upserts are not errors at this level; they are
/// captured per rule in the
/// [`SyncReport`](crate::restriction_manager::SyncReport) so the run can
/// continue past them.
#[derive(Debug, Error)]
pub enum Error {
    /// The Bitbucket client could not be constructed from the given
    /// credential, so no request was attempted.
    #[error("Failed to construct the Bitbucket client: {0}")]
    Client(#[from] bitbucket_client::Error),
}
