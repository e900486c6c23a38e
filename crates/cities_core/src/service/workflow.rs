//! Shared pieces of confirm-then-submit revision workflows.

use crate::access::policy::{AccessChecker, RevisionOperation};
use crate::model::account::Account;
use crate::model::city::{City, CityId, RevisionId};
use crate::repo::city_repo::RepoError;
use crate::routing::Route;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from revision workflows.
#[derive(Debug)]
pub enum WorkflowError {
    Repo(RepoError),
    /// Actor may not perform the revision operation.
    AccessDenied { operation: RevisionOperation },
    /// Target revision has no variant in the requested language.
    TranslationNotFound {
        revision_id: RevisionId,
        langcode: String,
    },
}

impl WorkflowError {
    /// Whether the error means "resource not found" to page callers.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Repo(err) => err.is_not_found(),
            Self::AccessDenied { .. } => false,
            Self::TranslationNotFound { .. } => true,
        }
    }
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::AccessDenied { operation } => {
                write!(f, "access denied: {} revision", operation.as_str())
            }
            Self::TranslationNotFound {
                revision_id,
                langcode,
            } => write!(f, "revision {revision_id} has no `{langcode}` translation"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::AccessDenied { .. } | Self::TranslationNotFound { .. } => None,
        }
    }
}

impl From<RepoError> for WorkflowError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Fails with `WorkflowError::AccessDenied` unless `actor` may perform
/// `operation` on revisions.
pub(crate) fn ensure_revision_access<A: AccessChecker>(
    access: &A,
    operation: RevisionOperation,
    actor: &Account,
) -> Result<(), WorkflowError> {
    if access.check_revision_access(operation, actor).is_allowed() {
        return Ok(());
    }
    Err(WorkflowError::AccessDenied { operation })
}

/// Pending confirmation of a revision workflow. Nothing is written until
/// it is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub(crate) revision: City,
    pub(crate) langcode: Option<String>,
    pub question: String,
    pub confirm_text: String,
    pub description: String,
    pub cancel_route: Route,
}

impl Confirmation {
    pub(crate) fn new(
        revision: City,
        langcode: Option<String>,
        question: String,
        confirm_text: &str,
    ) -> Self {
        let cancel_route = Route::VersionHistory {
            city_id: revision.id.unwrap_or_default(),
        };
        Self {
            revision,
            langcode,
            question,
            confirm_text: confirm_text.to_string(),
            description: String::new(),
            cancel_route,
        }
    }

    /// Revision the workflow targets.
    pub fn revision(&self) -> &City {
        &self.revision
    }

    /// Language variant targeted by translation workflows.
    pub fn langcode(&self) -> Option<&str> {
        self.langcode.as_deref()
    }
}

/// Result of a submitted workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub city_id: CityId,
    /// Revision written (revert) or removed (delete).
    pub revision_id: RevisionId,
    /// User-facing notice.
    pub message: String,
    pub redirect: Route,
}
