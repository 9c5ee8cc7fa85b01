//! Tests for restriction_manager module.

use super::*;
use async_trait::async_trait;
use bitbucket_client::{BranchRestriction, BranchRestrictionPayload};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// Scripted client double implementing the branch-restriction API seam.
// Results are consumed in call order; a call with no scripted result is a
// test bug and panics.
#[derive(Clone, Default)]
struct MockApi {
    create_results: Arc<Mutex<VecDeque<Result<BranchRestriction, ClientError>>>>,
    update_results: Arc<Mutex<VecDeque<Result<BranchRestriction, ClientError>>>>,
    create_calls: Arc<Mutex<Vec<BranchRestrictionPayload>>>,
    update_calls: Arc<Mutex<Vec<(u64, BranchRestrictionPayload)>>>,
}

impl MockApi {
    fn new() -> Self {
        Self::default()
    }

    fn push_create(&self, result: Result<BranchRestriction, ClientError>) {
        self.create_results.lock().unwrap().push_back(result);
    }

    fn push_update(&self, result: Result<BranchRestriction, ClientError>) {
        self.update_results.lock().unwrap().push_back(result);
    }

    fn create_calls(&self) -> Vec<BranchRestrictionPayload> {
        self.create_calls.lock().unwrap().clone()
    }

    fn update_calls(&self) -> Vec<(u64, BranchRestrictionPayload)> {
        self.update_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BranchRestrictionApi for MockApi {
    async fn create_branch_restriction(
        &self,
        _repo: &RepositoryRef,
        payload: &BranchRestrictionPayload,
    ) -> Result<BranchRestriction, ClientError> {
        self.create_calls.lock().unwrap().push(payload.clone());
        self.create_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected create call")
    }

    async fn update_branch_restriction(
        &self,
        _repo: &RepositoryRef,
        id: u64,
        payload: &BranchRestrictionPayload,
    ) -> Result<BranchRestriction, ClientError> {
        self.update_calls.lock().unwrap().push((id, payload.clone()));
        self.update_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected update call")
    }
}

fn test_repo() -> RepositoryRef {
    RepositoryRef::new("acme", "widgets")
}

fn restriction(id: u64) -> BranchRestriction {
    BranchRestriction {
        id,
        kind: "restrict_merges".to_string(),
        branch_match_kind: None,
        pattern: Some("release/*".to_string()),
        value: None,
    }
}

fn conflict(existing_id: Option<u64>) -> ClientError {
    ClientError::Conflict {
        existing_id,
        body: "already exists".to_string(),
    }
}

fn merge_rule() -> RestrictionRule {
    RestrictionRule::RestrictMerge {
        pattern: "release/*".to_string(),
        users: vec![],
        groups: vec![],
    }
}

fn approvals_rule() -> RestrictionRule {
    RestrictionRule::RequireApprovals {
        pattern: "release/*".to_string(),
        count: 2,
    }
}

// Produces a genuine transport error by connecting to a port nothing
// listens on.
async fn transport_error() -> ClientError {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{port}/"))
        .send()
        .await
        .expect_err("connection to a closed port must fail");
    ClientError::Transport(err)
}

// ============================================================================
// Upsert behaviour
// ============================================================================

#[tokio::test]
async fn test_created_rule_issues_no_follow_up() {
    let api = MockApi::new();
    api.push_create(Ok(restriction(7)));

    let manager = RestrictionManager::new(api.clone());
    let report = manager
        .apply_restrictions(&test_repo(), &[merge_rule()])
        .await;

    assert_eq!(
        report.outcomes[0].status,
        ApplyStatus::Created { id: 7 }
    );
    assert!(api.update_calls().is_empty());
}

#[tokio::test]
async fn test_conflict_issues_single_update_with_extracted_id() {
    let api = MockApi::new();
    api.push_create(Err(conflict(Some(42))));
    api.push_update(Ok(restriction(42)));

    let manager = RestrictionManager::new(api.clone());
    let report = manager
        .apply_restrictions(&test_repo(), &[approvals_rule()])
        .await;

    assert_eq!(
        report.outcomes[0].status,
        ApplyStatus::Updated { id: 42 }
    );

    let updates = api.update_calls();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, 42);
    // The overwrite reuses the create payload unchanged.
    assert_eq!(updates[0].1, approvals_rule().to_payload());
}

#[tokio::test]
async fn test_conflict_without_id_marks_rule_failed() {
    let api = MockApi::new();
    api.push_create(Err(conflict(None)));

    let manager = RestrictionManager::new(api.clone());
    let report = manager
        .apply_restrictions(&test_repo(), &[merge_rule()])
        .await;

    assert!(matches!(
        report.outcomes[0].status,
        ApplyStatus::Failed { .. }
    ));
    assert!(api.update_calls().is_empty());
}

#[tokio::test]
async fn test_failed_update_marks_rule_failed_without_retry() {
    let api = MockApi::new();
    api.push_create(Err(conflict(Some(42))));
    api.push_update(Err(ClientError::Remote {
        status: 500,
        body: "server error".to_string(),
    }));

    let manager = RestrictionManager::new(api.clone());
    let report = manager
        .apply_restrictions(&test_repo(), &[merge_rule()])
        .await;

    assert!(matches!(
        report.outcomes[0].status,
        ApplyStatus::Failed { .. }
    ));
    assert_eq!(api.update_calls().len(), 1);
}

#[tokio::test]
async fn test_transport_failure_does_not_stop_later_rules() {
    let api = MockApi::new();
    api.push_create(Err(transport_error().await));
    api.push_create(Ok(restriction(9)));

    let manager = RestrictionManager::new(api.clone());
    let report = manager
        .apply_restrictions(&test_repo(), &[merge_rule(), approvals_rule()])
        .await;

    assert_eq!(api.create_calls().len(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.created(), 1);
    assert_eq!(
        report.failed_kinds(),
        vec![RestrictionKind::RestrictMerge]
    );
}

#[tokio::test]
async fn test_remote_rejection_reason_carried_in_report() {
    let api = MockApi::new();
    api.push_create(Err(ClientError::Remote {
        status: 403,
        body: "insufficient privileges".to_string(),
    }));

    let manager = RestrictionManager::new(api.clone());
    let report = manager
        .apply_restrictions(&test_repo(), &[merge_rule()])
        .await;

    match &report.outcomes[0].status {
        ApplyStatus::Failed { reason } => {
            assert!(reason.contains("403"));
            assert!(reason.contains("insufficient privileges"));
        }
        other => panic!("Expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rules_applied_in_given_order() {
    let settings = crate::rules::RuleSettings {
        branch_pattern: "release/*".to_string(),
        require_default_reviewer_approvals: true,
        require_approvals: true,
        require_passing_builds: true,
        ..crate::rules::RuleSettings::default()
    };

    let api = MockApi::new();
    for id in 1..=4 {
        api.push_create(Ok(restriction(id)));
    }

    let manager = RestrictionManager::new(api.clone());
    let report = manager
        .apply_restrictions(&test_repo(), &settings.planned_rules())
        .await;

    let kinds: Vec<&'static str> = api.create_calls().iter().map(|p| p.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "restrict_merges",
            "require_default_reviewer_approvals_to_merge",
            "require_approvals_to_merge",
            "require_passing_builds_to_merge",
        ]
    );
    assert_eq!(report.created(), 4);
    assert!(report.is_success());
}

// ============================================================================
// SyncReport
// ============================================================================

#[test]
fn test_sync_report_new_is_empty() {
    let report = SyncReport::new();

    assert!(report.outcomes.is_empty());
    assert_eq!(report.created(), 0);
    assert_eq!(report.updated(), 0);
    assert_eq!(report.failed(), 0);
    assert!(report.is_success());
    assert!(!report.has_changes());
}

#[test]
fn test_sync_report_default_matches_new() {
    assert_eq!(SyncReport::default(), SyncReport::new());
}

#[test]
fn test_sync_report_counters() {
    let report = SyncReport {
        outcomes: vec![
            RuleOutcome {
                kind: RestrictionKind::RestrictMerge,
                status: ApplyStatus::Created { id: 1 },
            },
            RuleOutcome {
                kind: RestrictionKind::RequireApprovals,
                status: ApplyStatus::Updated { id: 2 },
            },
            RuleOutcome {
                kind: RestrictionKind::RequirePassingBuilds,
                status: ApplyStatus::Failed {
                    reason: "boom".to_string(),
                },
            },
        ],
    };

    assert_eq!(report.created(), 1);
    assert_eq!(report.updated(), 1);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());
    assert!(report.has_changes());
    assert_eq!(
        report.failed_kinds(),
        vec![RestrictionKind::RequirePassingBuilds]
    );
}
