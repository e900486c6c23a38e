//! City access policy.

use crate::model::account::Account;
use crate::model::city::City;
use serde::{Deserialize, Serialize};

/// Grants viewing published cities.
pub const PERMISSION_VIEW_PUBLISHED: &str = "view published cities list entities";
/// Grants viewing unpublished cities.
pub const PERMISSION_VIEW_UNPUBLISHED: &str = "view unpublished cities list entities";
/// Grants creating cities.
pub const PERMISSION_ADD: &str = "add cities list entities";
/// Grants editing cities.
pub const PERMISSION_EDIT: &str = "edit cities list entities";
/// Grants deleting cities.
pub const PERMISSION_DELETE: &str = "delete cities list entities";
/// Grants viewing historical revisions.
pub const PERMISSION_VIEW_REVISIONS: &str = "view all cities list revisions";
/// Grants reverting to historical revisions.
pub const PERMISSION_REVERT_REVISIONS: &str = "revert all cities list revisions";
/// Grants deleting historical revisions.
pub const PERMISSION_DELETE_REVISIONS: &str = "delete all cities list revisions";
/// Grants every revision operation.
pub const PERMISSION_ADMINISTER: &str = "administer cities list entities";

/// Operation name for viewing an entity.
pub const OPERATION_VIEW: &str = "view";
/// Operation name for editing an entity.
pub const OPERATION_UPDATE: &str = "update";
/// Operation name for deleting an entity.
pub const OPERATION_DELETE: &str = "delete";

/// Outcome of one access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessResult {
    Allowed,
    Forbidden,
    /// No opinion; the caller applies its default-deny fallback.
    Neutral,
}

impl AccessResult {
    /// `Allowed` when `account` holds `permission`, else `Forbidden`.
    pub fn allowed_if_has_permission(account: &Account, permission: &str) -> Self {
        Self::allowed_if(account.has_permission(permission))
    }

    /// `Allowed` when `account` holds any of `permissions`, else `Forbidden`.
    pub fn allowed_if_has_any_permission(account: &Account, permissions: &[&str]) -> Self {
        Self::allowed_if(
            permissions
                .iter()
                .any(|permission| account.has_permission(permission)),
        )
    }

    fn allowed_if(condition: bool) -> Self {
        if condition {
            Self::Allowed
        } else {
            Self::Forbidden
        }
    }

    /// Default-deny resolution: only `Allowed` grants access.
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }

    pub fn is_forbidden(self) -> bool {
        self == Self::Forbidden
    }

    pub fn is_neutral(self) -> bool {
        self == Self::Neutral
    }
}

/// Operations on historical revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionOperation {
    View,
    Revert,
    Delete,
}

impl RevisionOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Revert => "revert",
            Self::Delete => "delete",
        }
    }
}

/// Entity access decisions.
pub trait AccessChecker {
    /// Checks `operation` on `city` for `actor`.
    fn check_access(&self, operation: &str, city: &City, actor: &Account) -> AccessResult;
    /// Checks creating a new city.
    fn check_create_access(&self, actor: &Account) -> AccessResult;
    /// Checks a revision operation.
    fn check_revision_access(&self, operation: RevisionOperation, actor: &Account)
        -> AccessResult;
}

/// Permission-based access policy for cities.
#[derive(Debug, Clone, Copy, Default)]
pub struct CityAccessControlHandler;

impl CityAccessControlHandler {
    pub fn new() -> Self {
        Self
    }
}

impl AccessChecker for CityAccessControlHandler {
    fn check_access(&self, operation: &str, city: &City, actor: &Account) -> AccessResult {
        match operation {
            OPERATION_VIEW => {
                if !city.is_published() {
                    return AccessResult::allowed_if_has_permission(
                        actor,
                        PERMISSION_VIEW_UNPUBLISHED,
                    );
                }
                AccessResult::allowed_if_has_permission(actor, PERMISSION_VIEW_PUBLISHED)
            }
            OPERATION_UPDATE => AccessResult::allowed_if_has_permission(actor, PERMISSION_EDIT),
            OPERATION_DELETE => AccessResult::allowed_if_has_permission(actor, PERMISSION_DELETE),
            _ => AccessResult::Neutral,
        }
    }

    fn check_create_access(&self, actor: &Account) -> AccessResult {
        AccessResult::allowed_if_has_permission(actor, PERMISSION_ADD)
    }

    fn check_revision_access(
        &self,
        operation: RevisionOperation,
        actor: &Account,
    ) -> AccessResult {
        let permission = match operation {
            RevisionOperation::View => PERMISSION_VIEW_REVISIONS,
            RevisionOperation::Revert => PERMISSION_REVERT_REVISIONS,
            RevisionOperation::Delete => PERMISSION_DELETE_REVISIONS,
        };
        AccessResult::allowed_if_has_any_permission(actor, &[permission, PERMISSION_ADMINISTER])
    }
}

/// Row-level action flags for the revision history table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevisionPermissions {
    pub can_revert: bool,
    pub can_delete: bool,
}

impl RevisionPermissions {
    /// Derives revert/delete flags for `actor` from `checker`.
    pub fn for_account(checker: &impl AccessChecker, actor: &Account) -> Self {
        Self {
            can_revert: checker
                .check_revision_access(RevisionOperation::Revert, actor)
                .is_allowed(),
            can_delete: checker
                .check_revision_access(RevisionOperation::Delete, actor)
                .is_allowed(),
        }
    }
}
