//! Restriction rule model and settings parsing.
//!
//! This module turns user-facing rule settings (flat fields with
//! comma-separated access lists, mirroring the legacy configuration surface)
//! into the ordered set of [`RestrictionRule`]s a sync run applies.

use std::fmt;

use bitbucket_client::{BranchMatchKind, BranchRestrictionPayload, GroupRef, UserRef};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;

/// Sentinel access-list value meaning "no user/group restriction".
const EVERYBODY: &str = "Everybody";

/// The rule kinds this system manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestrictionKind {
    /// Restrict who may merge into matching branches
    RestrictMerge,
    /// Require approvals from the repository's default reviewers
    RequireDefaultReviewerApprovals,
    /// Require a number of approvals from any reviewer
    RequireApprovals,
    /// Require a number of passing builds
    RequirePassingBuilds,
}

impl RestrictionKind {
    /// Returns the wire kind string used by the remote API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RestrictMerge => "restrict_merges",
            Self::RequireDefaultReviewerApprovals => "require_default_reviewer_approvals_to_merge",
            Self::RequireApprovals => "require_approvals_to_merge",
            Self::RequirePassingBuilds => "require_passing_builds_to_merge",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One branch restriction to ensure on the remote repository.
///
/// Rules are value objects built fresh from [`RuleSettings`] on every run;
/// nothing about the remote state is cached between runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestrictionRule {
    /// Restrict merging into matching branches to the given users/groups.
    /// Empty lists mean nobody is exempt from the restriction.
    RestrictMerge {
        pattern: String,
        users: Vec<String>,
        groups: Vec<String>,
    },

    /// Require `count` approvals from default reviewers before merging.
    RequireDefaultReviewerApprovals { pattern: String, count: u32 },

    /// Require `count` approvals before merging.
    RequireApprovals { pattern: String, count: u32 },

    /// Require `count` passing builds before merging.
    RequirePassingBuilds { pattern: String, count: u32 },
}

impl RestrictionRule {
    /// Returns the kind of this rule.
    pub fn kind(&self) -> RestrictionKind {
        match self {
            Self::RestrictMerge { .. } => RestrictionKind::RestrictMerge,
            Self::RequireDefaultReviewerApprovals { .. } => {
                RestrictionKind::RequireDefaultReviewerApprovals
            }
            Self::RequireApprovals { .. } => RestrictionKind::RequireApprovals,
            Self::RequirePassingBuilds { .. } => RestrictionKind::RequirePassingBuilds,
        }
    }

    /// Returns the branch pattern this rule targets.
    pub fn pattern(&self) -> &str {
        match self {
            Self::RestrictMerge { pattern, .. }
            | Self::RequireDefaultReviewerApprovals { pattern, .. }
            | Self::RequireApprovals { pattern, .. }
            | Self::RequirePassingBuilds { pattern, .. } => pattern,
        }
    }

    /// Serializes the rule into the wire payload expected by the remote API.
    pub fn to_payload(&self) -> BranchRestrictionPayload {
        match self {
            Self::RestrictMerge {
                pattern,
                users,
                groups,
            } => BranchRestrictionPayload::RestrictMerges {
                branch_match_kind: BranchMatchKind::Glob,
                pattern: pattern.clone(),
                users: users
                    .iter()
                    .map(|username| UserRef {
                        username: username.clone(),
                    })
                    .collect(),
                groups: groups
                    .iter()
                    .map(|slug| GroupRef { slug: slug.clone() })
                    .collect(),
            },
            Self::RequireDefaultReviewerApprovals { pattern, count } => {
                BranchRestrictionPayload::RequireDefaultReviewerApprovalsToMerge {
                    value: *count,
                    branch_match_kind: BranchMatchKind::Glob,
                    pattern: pattern.clone(),
                }
            }
            Self::RequireApprovals { pattern, count } => {
                BranchRestrictionPayload::RequireApprovalsToMerge {
                    value: *count,
                    branch_match_kind: BranchMatchKind::Glob,
                    pattern: pattern.clone(),
                }
            }
            Self::RequirePassingBuilds { pattern, count } => {
                BranchRestrictionPayload::RequirePassingBuildsToMerge {
                    value: *count,
                    branch_match_kind: BranchMatchKind::Glob,
                    pattern: pattern.clone(),
                }
            }
        }
    }
}

/// User-facing rule settings.
///
/// The field surface mirrors the legacy configuration: one glob pattern, two
/// comma-separated access lists, and three optional threshold rules, each
/// gated by its own flag. The merge restriction itself is always applied.
///
/// # Example TOML
///
/// ```toml
/// branch_pattern = "release/*"
/// merge_access_users = "alice, bob"
/// merge_access_groups = "release-managers"
/// require_approvals = true
/// required_approvals = 2
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSettings {
    /// Glob pattern selecting the branches the rules apply to
    pub branch_pattern: String,

    /// Comma-separated usernames allowed to merge; empty or `Everybody`
    /// means unrestricted
    #[serde(default)]
    pub merge_access_users: String,

    /// Comma-separated group slugs allowed to merge; empty or `Everybody`
    /// means unrestricted
    #[serde(default)]
    pub merge_access_groups: String,

    /// Whether to require approvals from default reviewers
    #[serde(default)]
    pub require_default_reviewer_approvals: bool,

    /// Number of default-reviewer approvals required
    #[serde(default = "RuleSettings::default_count")]
    pub default_reviewer_approvals: u32,

    /// Whether to require a number of approvals from any reviewer
    #[serde(default)]
    pub require_approvals: bool,

    /// Number of approvals required
    #[serde(default = "RuleSettings::default_count")]
    pub required_approvals: u32,

    /// Whether to require passing builds
    #[serde(default)]
    pub require_passing_builds: bool,

    /// Number of passing builds required
    #[serde(default = "RuleSettings::default_count")]
    pub required_passing_builds: u32,
}

impl RuleSettings {
    /// Default threshold used when a count field is omitted.
    fn default_count() -> u32 {
        1
    }

    /// Materializes the enabled rules in application order.
    ///
    /// The merge restriction always comes first, followed by the enabled
    /// threshold rules: default-reviewer approvals, then general approvals,
    /// then passing builds. The order is fixed and observable on the wire.
    pub fn planned_rules(&self) -> Vec<RestrictionRule> {
        let mut rules = vec![RestrictionRule::RestrictMerge {
            pattern: self.branch_pattern.clone(),
            users: parse_principals(&self.merge_access_users),
            groups: parse_principals(&self.merge_access_groups),
        }];

        if self.require_default_reviewer_approvals {
            rules.push(RestrictionRule::RequireDefaultReviewerApprovals {
                pattern: self.branch_pattern.clone(),
                count: self.default_reviewer_approvals,
            });
        }
        if self.require_approvals {
            rules.push(RestrictionRule::RequireApprovals {
                pattern: self.branch_pattern.clone(),
                count: self.required_approvals,
            });
        }
        if self.require_passing_builds {
            rules.push(RestrictionRule::RequirePassingBuilds {
                pattern: self.branch_pattern.clone(),
                count: self.required_passing_builds,
            });
        }

        rules
    }
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            branch_pattern: String::new(),
            merge_access_users: String::new(),
            merge_access_groups: String::new(),
            require_default_reviewer_approvals: false,
            default_reviewer_approvals: Self::default_count(),
            require_approvals: false,
            required_approvals: Self::default_count(),
            require_passing_builds: false,
            required_passing_builds: Self::default_count(),
        }
    }
}

/// Splits a comma-separated user or group access list.
///
/// A raw value that is empty or exactly `Everybody` yields an empty list,
/// which the remote treats as "no restriction". Otherwise the value is split
/// on commas, tokens are trimmed, and empty tokens are dropped. No existence
/// validation is performed; tokens are carried verbatim.
///
/// An `Everybody` token appearing inside a longer list is ignored with a
/// warning: the empty-list form is the supported way to lift the
/// restriction, and a wildcard mixed into an explicit list has no coherent
/// meaning.
pub fn parse_principals(raw: &str) -> Vec<String> {
    if raw.is_empty() || raw == EVERYBODY {
        return Vec::new();
    }

    raw.split(',')
        .map(str::trim)
        .filter(|token| {
            if token.is_empty() {
                return false;
            }
            if *token == EVERYBODY {
                warn!(
                    token = EVERYBODY,
                    "Ignoring wildcard token inside an explicit access list"
                );
                return false;
            }
            true
        })
        .map(str::to_string)
        .collect()
}
