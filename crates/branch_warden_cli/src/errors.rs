use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the BranchWarden CLI application.
///
/// This enum represents all possible error conditions that can arise during
/// CLI operations, including configuration issues, missing credentials, and
/// sync preparation failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or parsing configuration.
    ///
    /// This error is returned when there are issues with the configuration
    /// file, such as missing required fields, invalid values, or file access
    /// problems.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable credential could be resolved.
    ///
    /// This error is raised before any network call is made: an absent
    /// username or app password is a configuration problem, not a sync
    /// failure.
    #[error("Credential error: {0}")]
    CredentialMissing(String),

    /// The sync workflow could not be prepared.
    ///
    /// This wraps client-construction failures from the core crate. Per-rule
    /// outcomes are not errors; they are reported in the sync report.
    #[error("Sync failed: {0}")]
    Sync(#[from] branch_warden_core::Error),
}
