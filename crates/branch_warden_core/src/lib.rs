//! Core branch-restriction sync workflow.
//!
//! This crate turns user-facing rule settings into branch restrictions on a
//! Bitbucket Cloud repository. Each enabled rule is upserted independently:
//! created when absent, overwritten by id when the remote reports it already
//! exists, and reported as failed (without aborting the run) otherwise.

pub mod errors;
pub mod restriction_manager;
pub mod rules;

pub use errors::Error;
pub use restriction_manager::{ApplyStatus, RestrictionManager, RuleOutcome, SyncReport};
pub use rules::{parse_principals, RestrictionKind, RestrictionRule, RuleSettings};

use bitbucket_client::{BitbucketClient, Credential, RepositoryRef};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Ensures the configured branch restrictions exist on the remote repository.
///
/// Builds a client for the credential, materializes the enabled rules from
/// the settings, and applies them in order. Per-rule failures are captured in
/// the returned [`SyncReport`]; the only error surfaced here is a client that
/// could not be constructed, which happens before any network call.
///
/// # Errors
///
/// Returns [`Error::Client`] if the credential cannot be encoded into an
/// authorization header or the HTTP client cannot be built.
pub async fn sync_branch_restrictions(
    repo: &RepositoryRef,
    credential: &Credential,
    settings: &RuleSettings,
) -> Result<SyncReport, Error> {
    let client = BitbucketClient::new(credential)?;
    let manager = RestrictionManager::new(client);

    Ok(manager
        .apply_restrictions(repo, &settings.planned_rules())
        .await)
}
