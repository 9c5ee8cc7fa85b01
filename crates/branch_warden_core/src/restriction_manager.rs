//! Branch restriction sync orchestration.
//!
//! This module provides the [`RestrictionManager`] component for pushing
//! branch restrictions to a repository with create-or-update semantics.

use bitbucket_client::{BranchRestrictionApi, Error as ClientError, RepositoryRef};
use tracing::{error, info, warn};

use crate::rules::{RestrictionKind, RestrictionRule};

#[cfg(test)]
#[path = "restriction_manager_tests.rs"]
mod tests;

/// Applies branch restrictions to a repository.
///
/// For each rule the manager attempts a create against the collection
/// endpoint; when the remote reports a conflict with a recoverable id, the
/// existing restriction is overwritten through the member endpoint. The
/// operation is idempotent and safe to run repeatedly.
///
/// # Error Handling
///
/// - Rule outcomes are independent: a failure on one rule never prevents the
///   remaining rules from being attempted.
/// - A conflict whose body carries no recoverable id, and a failed follow-up
///   update, both mark the rule failed without retrying.
/// - All outcomes are reported in the returned [`SyncReport`].
///
/// # Examples
///
/// ```rust,no_run
/// use bitbucket_client::{BitbucketClient, RepositoryRef};
/// use branch_warden_core::{RestrictionManager, RuleSettings};
///
/// # async fn example(client: BitbucketClient, settings: RuleSettings) {
/// let manager = RestrictionManager::new(client);
/// let repo = RepositoryRef::new("acme", "widgets");
///
/// let report = manager
///     .apply_restrictions(&repo, &settings.planned_rules())
///     .await;
/// println!("Created: {}, Updated: {}", report.created(), report.updated());
/// # }
/// ```
pub struct RestrictionManager<C> {
    /// Client for branch-restriction API operations
    client: C,
}

impl<C: BranchRestrictionApi> RestrictionManager<C> {
    /// Creates a new RestrictionManager over the given client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Ensures every given rule exists on the remote repository, creating or
    /// overwriting as needed.
    ///
    /// Rules are applied strictly in the order given; each upsert completes
    /// before the next begins.
    pub async fn apply_restrictions(
        &self,
        repo: &RepositoryRef,
        rules: &[RestrictionRule],
    ) -> SyncReport {
        info!(
            owner = %repo.owner,
            repo = %repo.slug,
            rule_count = rules.len(),
            "Applying branch restrictions"
        );

        let mut report = SyncReport::new();

        for rule in rules {
            let status = self.upsert_rule(repo, rule).await;
            match &status {
                ApplyStatus::Created { id } => {
                    info!(kind = %rule.kind(), id = id, "Branch restriction created");
                }
                ApplyStatus::Updated { id } => {
                    info!(kind = %rule.kind(), id = id, "Branch restriction updated");
                }
                ApplyStatus::Failed { reason } => {
                    warn!(kind = %rule.kind(), reason = %reason, "Branch restriction not applied");
                }
            }
            report.record(rule.kind(), status);
        }

        info!(
            created = report.created(),
            updated = report.updated(),
            failed = report.failed(),
            "Branch restriction sync complete"
        );

        report
    }

    async fn upsert_rule(&self, repo: &RepositoryRef, rule: &RestrictionRule) -> ApplyStatus {
        let payload = rule.to_payload();

        match self.client.create_branch_restriction(repo, &payload).await {
            Ok(created) => ApplyStatus::Created { id: created.id },
            Err(ClientError::Conflict {
                existing_id: Some(id),
                ..
            }) => match self.client.update_branch_restriction(repo, id, &payload).await {
                Ok(_) => ApplyStatus::Updated { id },
                Err(e) => {
                    error!(
                        kind = %rule.kind(),
                        id = id,
                        error = %e,
                        "Failed to overwrite existing branch restriction"
                    );
                    ApplyStatus::Failed {
                        reason: format!("update of existing restriction {id} failed: {e}"),
                    }
                }
            },
            Err(ClientError::Conflict {
                existing_id: None,
                body,
            }) => {
                error!(
                    kind = %rule.kind(),
                    body = %body,
                    "Conflict response did not carry a recognizable restriction id"
                );
                ApplyStatus::Failed {
                    reason: "conflict response did not carry an existing restriction id"
                        .to_string(),
                }
            }
            Err(e) => {
                error!(kind = %rule.kind(), error = %e, "Failed to create branch restriction");
                ApplyStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Outcome of one rule upsert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyStatus {
    /// A new restriction was created on the collection endpoint
    Created { id: u64 },

    /// An existing restriction was overwritten through the member endpoint
    Updated { id: u64 },

    /// The rule could not be applied; the run continued with the next rule
    Failed { reason: String },
}

/// The outcome of one rule in a sync run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Which rule kind was attempted
    pub kind: RestrictionKind,

    /// What happened to it
    pub status: ApplyStatus,
}

/// Aggregated result of a sync run.
///
/// Lists one [`RuleOutcome`] per attempted rule, in application order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    /// Per-rule outcomes in application order
    pub outcomes: Vec<RuleOutcome>,
}

impl SyncReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, kind: RestrictionKind, status: ApplyStatus) {
        self.outcomes.push(RuleOutcome { kind, status });
    }

    /// Number of restrictions created.
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ApplyStatus::Created { .. }))
            .count()
    }

    /// Number of existing restrictions overwritten.
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ApplyStatus::Updated { .. }))
            .count()
    }

    /// Number of rules that failed to apply.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ApplyStatus::Failed { .. }))
            .count()
    }

    /// Kinds of the rules that failed (for error reporting).
    pub fn failed_kinds(&self) -> Vec<RestrictionKind> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ApplyStatus::Failed { .. }))
            .map(|o| o.kind)
            .collect()
    }

    /// Returns true if every attempted rule was applied.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Returns true if any restriction was created or overwritten.
    pub fn has_changes(&self) -> bool {
        self.created() > 0 || self.updated() > 0
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}
