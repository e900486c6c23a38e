//! Revision revert workflows.
//!
//! # Responsibility
//! - Confirm and execute reverting a city to a historical revision.
//! - Confirm and execute reverting one language variant only.
//!
//! # Invariants
//! - A revert never mutates the source revision; it writes a new default
//!   revision whose content equals the source.
//! - The only store mutation is one atomic `CityStorage::save`.
//! - The source creation timestamp is captured before it is overwritten.
//! - `build` and `submit` both require the revert revision permission.

use crate::access::policy::{AccessChecker, RevisionOperation};
use crate::datetime::{Clock, DateFormatter, DateStyle};
use crate::model::account::Account;
use crate::model::city::{City, CityId, RevisionId};
use crate::repo::city_repo::{CityStorage, RepoError};
use crate::routing::Route;
use crate::service::workflow::{
    ensure_revision_access, Confirmation, WorkflowError, WorkflowOutcome,
};
use log::info;

const REVERT_CONFIRM_TEXT: &str = "Revert";

/// Confirm form reverting a whole city revision.
pub struct RevisionRevertForm<S, F, C, A> {
    storage: S,
    formatter: F,
    clock: C,
    access: A,
}

impl<S, F, C, A> RevisionRevertForm<S, F, C, A>
where
    S: CityStorage,
    F: DateFormatter,
    C: Clock,
    A: AccessChecker,
{
    pub fn new(storage: S, formatter: F, clock: C, access: A) -> Self {
        Self {
            storage,
            formatter,
            clock,
            access,
        }
    }

    /// Loads the target revision and phrases the confirmation question.
    pub fn build(
        &self,
        city_id: CityId,
        revision_id: RevisionId,
        actor: &Account,
    ) -> Result<Confirmation, WorkflowError> {
        ensure_revision_access(&self.access, RevisionOperation::Revert, actor)?;
        let revision = self.storage.load_revision(city_id, revision_id)?;
        let question = format!(
            "Are you sure you want to revert to the revision from {}?",
            self.formatter
                .format(revision.revision_created, DateStyle::Medium)
        );
        Ok(Confirmation::new(
            revision,
            None,
            question,
            REVERT_CONFIRM_TEXT,
        ))
    }

    /// Writes a copy of the confirmed revision as the new default revision.
    ///
    /// # Errors
    /// - Storage failures propagate unchanged; the default revision pointer
    ///   keeps its previous value.
    pub fn submit(
        &self,
        confirmation: Confirmation,
        actor: &Account,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        ensure_revision_access(&self.access, RevisionOperation::Revert, actor)?;
        let mut revision = confirmation.revision;
        let source_revision_id = revision.revision_id;
        let original_timestamp = revision.revision_created;

        prepare_reverted_revision(&mut revision, self.clock.now_ms());
        execute_revert(
            &self.storage,
            &self.formatter,
            revision,
            source_revision_id,
            original_timestamp,
        )
    }
}

/// Confirm form reverting one language variant of a city.
pub struct TranslationRevertForm<S, F, C, A> {
    storage: S,
    formatter: F,
    clock: C,
    access: A,
}

impl<S, F, C, A> TranslationRevertForm<S, F, C, A>
where
    S: CityStorage,
    F: DateFormatter,
    C: Clock,
    A: AccessChecker,
{
    pub fn new(storage: S, formatter: F, clock: C, access: A) -> Self {
        Self {
            storage,
            formatter,
            clock,
            access,
        }
    }

    /// Loads the target revision and checks it carries `langcode`.
    pub fn build(
        &self,
        city_id: CityId,
        revision_id: RevisionId,
        langcode: &str,
        actor: &Account,
    ) -> Result<Confirmation, WorkflowError> {
        ensure_revision_access(&self.access, RevisionOperation::Revert, actor)?;
        let revision = self.storage.load_revision(city_id, revision_id)?;
        if !revision.has_translation(langcode) {
            return Err(WorkflowError::TranslationNotFound {
                revision_id,
                langcode: langcode.to_string(),
            });
        }
        let question = format!(
            "Are you sure you want to revert {langcode} translation to the revision from {}?",
            self.formatter
                .format(revision.revision_created, DateStyle::Medium)
        );
        Ok(Confirmation::new(
            revision,
            Some(langcode.to_string()),
            question,
            REVERT_CONFIRM_TEXT,
        ))
    }

    /// Copies the confirmed variant onto the current default revision and
    /// saves the result as a new default revision.
    pub fn submit(
        &self,
        confirmation: Confirmation,
        actor: &Account,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        ensure_revision_access(&self.access, RevisionOperation::Revert, actor)?;
        let source = confirmation.revision;
        let city_id = source
            .id
            .ok_or_else(|| RepoError::InvalidData("revert source has no city id".to_string()))?;
        let langcode = confirmation
            .langcode
            .unwrap_or_else(|| source.default_langcode.clone());
        let translation = source.translation(&langcode).cloned().ok_or_else(|| {
            WorkflowError::TranslationNotFound {
                revision_id: source.revision_id.unwrap_or_default(),
                langcode: langcode.clone(),
            }
        })?;

        let mut latest = self
            .storage
            .load(city_id)?
            .ok_or(RepoError::CityNotFound(city_id))?;
        latest.add_translation(langcode, translation);

        prepare_reverted_revision(&mut latest, self.clock.now_ms());
        execute_revert(
            &self.storage,
            &self.formatter,
            latest,
            source.revision_id,
            source.revision_created,
        )
    }
}

/// Turns a loaded revision into a new default revision stamped `now_ms`.
///
/// The revision author is cleared so it defaults to the owner on save.
pub fn prepare_reverted_revision(revision: &mut City, now_ms: i64) {
    revision.set_new_revision(true);
    revision.set_default_revision(true);
    revision.revision_created = now_ms;
    revision.revision_author = None;
}

fn execute_revert<S: CityStorage, F: DateFormatter>(
    storage: &S,
    formatter: &F,
    mut revision: City,
    source_revision_id: Option<RevisionId>,
    original_timestamp: i64,
) -> Result<WorkflowOutcome, WorkflowError> {
    let original_date = formatter.format(original_timestamp, DateStyle::Medium);
    revision.revision_log = Some(format!("Copy of the revision from {original_date}."));

    let revision_id = storage.save(&mut revision)?;
    let city_id = revision.id.unwrap_or_default();

    info!(
        "event=revision_revert module=service status=ok city_id={} source_revision_id={} revision_id={}",
        city_id,
        source_revision_id.unwrap_or_default(),
        revision_id
    );

    Ok(WorkflowOutcome {
        city_id,
        revision_id,
        message: format!(
            "Cities List {} has been reverted to the revision from {original_date}.",
            revision.label()
        ),
        redirect: Route::VersionHistory { city_id },
    })
}
