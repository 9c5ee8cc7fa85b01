//! Implementation of the `sync` command.

use bitbucket_client::{Credential, RepositoryRef};
use branch_warden_core::{ApplyStatus, SyncReport};
use clap::Args;
use secrecy::SecretString;
use tracing::info;

use crate::config::{self, AppConfig, AuthenticationConfig};
use crate::errors::Error;

/// Environment variable holding the Bitbucket app password.
pub const APP_PASSWORD_ENV: &str = "BRANCH_WARDEN_APP_PASSWORD";

#[cfg(test)]
#[path = "sync_cmd_tests.rs"]
mod tests;

/// Arguments for the `sync` command.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Override the Bitbucket username from the configuration file
    #[arg(long)]
    pub username: Option<String>,
}

/// Loads the configuration, resolves the credential, and runs the sync.
///
/// Credential problems are surfaced here, before any network call is made.
/// The returned report lists the outcome of every attempted rule; the caller
/// maps it to an exit code.
pub async fn execute(args: &SyncArgs) -> Result<SyncReport, Error> {
    let path = config::get_config_path(args.config.as_deref());
    let app_config = AppConfig::load(&path)?;

    if app_config.repository.owner.trim().is_empty()
        || app_config.repository.slug.trim().is_empty()
    {
        return Err(Error::Config(
            "repository owner and slug must be set".to_string(),
        ));
    }

    let credential = resolve_credential(&app_config.authentication, args.username.as_deref())?;
    let repo = RepositoryRef::new(
        app_config.repository.owner.as_str(),
        app_config.repository.slug.as_str(),
    );

    info!(repository = %repo, "Starting branch restriction sync");
    let report =
        branch_warden_core::sync_branch_restrictions(&repo, &credential, &app_config.rules)
            .await?;

    print_report(&report);
    Ok(report)
}

/// Resolves the Basic-auth credential for a sync run.
///
/// The username comes from the configuration file (or the `--username`
/// override); the app password always comes from the
/// `BRANCH_WARDEN_APP_PASSWORD` environment variable so it never lives in a
/// file.
fn resolve_credential(
    auth: &AuthenticationConfig,
    username_override: Option<&str>,
) -> Result<Credential, Error> {
    let username = username_override.unwrap_or(auth.username.as_str());
    if username.trim().is_empty() {
        return Err(Error::CredentialMissing(
            "no Bitbucket username configured; set [authentication] username or pass --username"
                .to_string(),
        ));
    }

    let app_password = std::env::var(APP_PASSWORD_ENV).map_err(|_| {
        Error::CredentialMissing(format!(
            "the {APP_PASSWORD_ENV} environment variable is not set"
        ))
    })?;
    if app_password.is_empty() {
        return Err(Error::CredentialMissing(format!(
            "the {APP_PASSWORD_ENV} environment variable is empty"
        )));
    }

    Ok(Credential::new(username, SecretString::from(app_password)))
}

fn print_report(report: &SyncReport) {
    for outcome in &report.outcomes {
        match &outcome.status {
            ApplyStatus::Created { id } => {
                println!("{}: created (id {id})", outcome.kind);
            }
            ApplyStatus::Updated { id } => {
                println!("{}: updated existing restriction (id {id})", outcome.kind);
            }
            ApplyStatus::Failed { reason } => {
                println!("{}: FAILED - {reason}", outcome.kind);
            }
        }
    }
}
