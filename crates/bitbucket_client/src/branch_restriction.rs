//! Branch restriction wire types.
//!
//! Request and response shapes for the Bitbucket Cloud branch-restrictions
//! resource. See: https://developer.atlassian.com/cloud/bitbucket/rest/api-group-branch-restrictions/

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "branch_restriction_tests.rs"]
mod tests;

/// How the `pattern` of a restriction is interpreted server-side.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BranchMatchKind {
    /// `pattern` is a glob over branch names (`*`/`?` wildcards)
    Glob,
    /// `pattern` names a branching-model role instead of a glob
    BranchingModel,
}

/// A user entry in a `restrict_merges` exemption list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    /// Bitbucket username
    pub username: String,
}

/// A group entry in a `restrict_merges` exemption list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRef {
    /// Workspace group slug
    pub slug: String,
}

/// Request payload for creating or overwriting a branch restriction.
///
/// The serde `kind` tag and the field layout match the remote schema exactly:
/// the variant names render to the wire kind strings
/// (`restrict_merges`, `require_default_reviewer_approvals_to_merge`,
/// `require_approvals_to_merge`, `require_passing_builds_to_merge`).
///
/// # Examples
///
/// ```rust
/// use bitbucket_client::{BranchMatchKind, BranchRestrictionPayload};
///
/// let payload = BranchRestrictionPayload::RequireApprovalsToMerge {
///     value: 2,
///     branch_match_kind: BranchMatchKind::Glob,
///     pattern: "release/*".to_string(),
/// };
///
/// let json = serde_json::to_string(&payload).unwrap();
/// assert!(json.contains("\"kind\":\"require_approvals_to_merge\""));
/// assert!(json.contains("\"value\":2"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BranchRestrictionPayload {
    /// Restrict who may merge into matching branches. Empty `users` and
    /// `groups` lists mean the restriction applies with no exemptions.
    RestrictMerges {
        branch_match_kind: BranchMatchKind,
        pattern: String,
        users: Vec<UserRef>,
        groups: Vec<GroupRef>,
    },

    /// Require `value` approvals from the default reviewers before merging.
    RequireDefaultReviewerApprovalsToMerge {
        value: u32,
        branch_match_kind: BranchMatchKind,
        pattern: String,
    },

    /// Require `value` approvals before merging.
    RequireApprovalsToMerge {
        value: u32,
        branch_match_kind: BranchMatchKind,
        pattern: String,
    },

    /// Require `value` passing builds before merging.
    RequirePassingBuildsToMerge {
        value: u32,
        branch_match_kind: BranchMatchKind,
        pattern: String,
    },
}

impl BranchRestrictionPayload {
    /// Returns the wire kind string for this payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RestrictMerges { .. } => "restrict_merges",
            Self::RequireDefaultReviewerApprovalsToMerge { .. } => {
                "require_default_reviewer_approvals_to_merge"
            }
            Self::RequireApprovalsToMerge { .. } => "require_approvals_to_merge",
            Self::RequirePassingBuildsToMerge { .. } => "require_passing_builds_to_merge",
        }
    }

    /// Returns the branch pattern this payload targets.
    pub fn pattern(&self) -> &str {
        match self {
            Self::RestrictMerges { pattern, .. }
            | Self::RequireDefaultReviewerApprovalsToMerge { pattern, .. }
            | Self::RequireApprovalsToMerge { pattern, .. }
            | Self::RequirePassingBuildsToMerge { pattern, .. } => pattern,
        }
    }
}

/// A branch restriction as returned by the API.
///
/// Only the fields this client consumes are modelled; the numeric `id` is the
/// handle used for member-endpoint updates. Unknown response fields are
/// ignored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BranchRestriction {
    /// Server-assigned restriction id
    pub id: u64,

    /// Wire kind string of the restriction
    pub kind: String,

    /// Pattern match mode, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_match_kind: Option<BranchMatchKind>,

    /// Branch pattern the restriction applies to, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Numeric threshold for approval/build kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}
