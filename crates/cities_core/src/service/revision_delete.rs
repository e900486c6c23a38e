//! Revision delete workflow.

use crate::access::policy::{AccessChecker, RevisionOperation};
use crate::datetime::{DateFormatter, DateStyle};
use crate::model::account::Account;
use crate::model::city::{CityId, RevisionId};
use crate::repo::city_repo::CityStorage;
use crate::routing::Route;
use crate::service::workflow::{
    ensure_revision_access, Confirmation, WorkflowError, WorkflowOutcome,
};
use log::info;

const DELETE_CONFIRM_TEXT: &str = "Delete";

/// Confirm form deleting one historical revision.
///
/// The current revision is protected by storage and yields
/// `RepoError::DefaultRevisionDelete`. Both steps require the delete
/// revision permission.
pub struct RevisionDeleteForm<S, F, A> {
    storage: S,
    formatter: F,
    access: A,
}

impl<S, F, A> RevisionDeleteForm<S, F, A>
where
    S: CityStorage,
    F: DateFormatter,
    A: AccessChecker,
{
    pub fn new(storage: S, formatter: F, access: A) -> Self {
        Self {
            storage,
            formatter,
            access,
        }
    }

    pub fn build(
        &self,
        city_id: CityId,
        revision_id: RevisionId,
        actor: &Account,
    ) -> Result<Confirmation, WorkflowError> {
        ensure_revision_access(&self.access, RevisionOperation::Delete, actor)?;
        let revision = self.storage.load_revision(city_id, revision_id)?;
        let question = format!(
            "Are you sure you want to delete the revision from {}?",
            self.formatter
                .format(revision.revision_created, DateStyle::Medium)
        );
        Ok(Confirmation::new(
            revision,
            None,
            question,
            DELETE_CONFIRM_TEXT,
        ))
    }

    pub fn submit(
        &self,
        confirmation: Confirmation,
        actor: &Account,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        ensure_revision_access(&self.access, RevisionOperation::Delete, actor)?;
        let revision = confirmation.revision;
        let city_id = revision.id.unwrap_or_default();
        let revision_id = revision.revision_id.unwrap_or_default();

        self.storage.delete_revision(city_id, revision_id)?;
        info!(
            "event=revision_delete module=service status=ok city_id={} revision_id={}",
            city_id, revision_id
        );

        Ok(WorkflowOutcome {
            city_id,
            revision_id,
            message: format!(
                "Revision from {} of Cities List {} has been deleted.",
                self.formatter
                    .format(revision.revision_created, DateStyle::Medium),
                revision.label()
            ),
            redirect: Route::VersionHistory { city_id },
        })
    }
}
