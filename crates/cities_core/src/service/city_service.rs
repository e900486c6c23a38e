//! City CRUD use-cases and collection listing.
//!
//! # Responsibility
//! - Provide create/edit/delete entry points with access checks.
//! - Stamp revision metadata for edits that create a new revision.
//! - Build the declarative collection listing.
//!
//! # Invariants
//! - Access is checked before any storage mutation.
//! - Validation failures are returned to the caller and nothing is persisted.
//! - Edits use full replacement semantics for the edited language variant.

use crate::access::policy::{AccessChecker, OPERATION_DELETE, OPERATION_UPDATE, OPERATION_VIEW};
use crate::datetime::Clock;
use crate::model::account::{Account, AccountId};
use crate::model::city::{
    Address, City, CityId, CityTranslation, CityValidationError, GeoPoint,
};
use crate::repo::city_repo::{CityListQuery, CityStorage, RepoError};
use crate::routing::Route;
use crate::service::history::OperationLink;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for city use-cases.
#[derive(Debug)]
pub enum CityServiceError {
    /// Submitted values violate field constraints.
    Validation(CityValidationError),
    CityNotFound(CityId),
    /// Actor may not perform `operation`.
    AccessDenied { operation: String },
    Repo(RepoError),
}

impl Display for CityServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::CityNotFound(id) => write!(f, "city not found: {id}"),
            Self::AccessDenied { operation } => write!(f, "access denied: {operation}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CityServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CityServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::CityNotFound(city_id) => Self::CityNotFound(city_id),
            other => Self::Repo(other),
        }
    }
}

/// Submitted form values for one language variant.
#[derive(Debug, Clone, PartialEq)]
pub struct CityInput {
    /// Variant to write; `None` uses the city's (or site's) default language.
    pub langcode: Option<String>,
    pub name: String,
    pub published: bool,
    pub pop: String,
    pub address: Option<Address>,
    pub gps: Option<GeoPoint>,
    /// Explicit owner; `None` keeps the current owner (or the actor on create).
    pub owner_id: Option<AccountId>,
}

impl CityInput {
    /// Published input with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            langcode: None,
            name: name.into(),
            published: true,
            pop: String::new(),
            address: None,
            gps: None,
            owner_id: None,
        }
    }

    fn apply_to(&self, translation: &mut CityTranslation) {
        translation.name = self.name.clone();
        translation.published = self.published;
        translation.pop = self.pop.clone();
        translation.address = self.address.clone();
        if self.address.is_none() {
            translation.country = None;
        }
        translation.gps = self.gps;
        if self.owner_id.is_some() {
            translation.owner_id = self.owner_id;
        }
    }
}

/// Revision options of the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionOptions {
    pub new_revision: bool,
    pub log_message: Option<String>,
}

impl Default for RevisionOptions {
    fn default() -> Self {
        Self {
            new_revision: true,
            log_message: None,
        }
    }
}

/// Result of a create/edit/delete submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CityFormOutcome {
    pub city: City,
    pub message: String,
    pub redirect: Route,
}

/// Declarative collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityListing {
    pub header: Vec<String>,
    pub rows: Vec<CityListRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityListRow {
    pub id: CityId,
    pub name: String,
    pub name_link: Route,
    pub operations: Vec<OperationLink>,
}

/// City CRUD facade over storage, access policy and clock.
pub struct CityService<S, A, C> {
    storage: S,
    access: A,
    clock: C,
    default_langcode: String,
}

impl<S, A, C> CityService<S, A, C>
where
    S: CityStorage,
    A: AccessChecker,
    C: Clock,
{
    pub fn new(storage: S, access: A, clock: C, default_langcode: impl Into<String>) -> Self {
        Self {
            storage,
            access,
            clock,
            default_langcode: default_langcode.into(),
        }
    }

    /// Creates a city owned by `actor` (unless the input names an owner).
    pub fn create(
        &self,
        input: &CityInput,
        actor: &Account,
    ) -> Result<CityFormOutcome, CityServiceError> {
        if !self.access.check_create_access(actor).is_allowed() {
            return Err(CityServiceError::AccessDenied {
                operation: "create".to_string(),
            });
        }

        let now = self.clock.now_ms();
        let langcode = input
            .langcode
            .clone()
            .unwrap_or_else(|| self.default_langcode.clone());
        let mut city = City::new(langcode.clone(), input.name.clone(), now);
        if let Some(translation) = city.translation_mut(&langcode) {
            input.apply_to(translation);
            translation.owner_id = input.owner_id.or(Some(actor.id));
        }
        city.revision_author = Some(actor.id);

        self.storage.save(&mut city)?;
        info!(
            "event=city_create module=service status=ok city_id={} actor_id={}",
            city.id.unwrap_or_default(),
            actor.id
        );

        let city_id = city.id.unwrap_or_default();
        Ok(CityFormOutcome {
            message: format!("Created the {} Cities List.", city.label()),
            redirect: Route::Canonical { city_id },
            city,
        })
    }

    /// Edits (or adds) one language variant of a city.
    pub fn update(
        &self,
        city_id: CityId,
        input: &CityInput,
        actor: &Account,
        options: &RevisionOptions,
    ) -> Result<CityFormOutcome, CityServiceError> {
        let mut city = self.load_checked(city_id, OPERATION_UPDATE, actor)?;
        let now = self.clock.now_ms();
        let langcode = input
            .langcode
            .clone()
            .unwrap_or_else(|| city.default_langcode.clone());

        if !city.has_translation(&langcode) {
            let mut translation = CityTranslation::new(input.name.clone(), now);
            translation.owner_id = Some(actor.id);
            city.add_translation(langcode.clone(), translation);
        }
        if let Some(translation) = city.translation_mut(&langcode) {
            input.apply_to(translation);
            translation.changed = now;
        }

        city.set_new_revision(options.new_revision);
        if options.new_revision {
            city.revision_created = now;
            city.revision_author = Some(actor.id);
            city.revision_log = options.log_message.clone();
        }

        self.storage.save(&mut city)?;
        info!(
            "event=city_update module=service status=ok city_id={} revision_id={} actor_id={}",
            city_id,
            city.revision_id.unwrap_or_default(),
            actor.id
        );

        Ok(CityFormOutcome {
            message: format!("Saved the {} Cities List.", city.label()),
            redirect: Route::Canonical { city_id },
            city,
        })
    }

    /// Deletes a city with all its revisions.
    pub fn delete(
        &self,
        city_id: CityId,
        actor: &Account,
    ) -> Result<CityFormOutcome, CityServiceError> {
        let city = self.load_checked(city_id, OPERATION_DELETE, actor)?;
        self.storage.delete(city_id)?;
        info!(
            "event=city_delete module=service status=ok city_id={} actor_id={}",
            city_id, actor.id
        );

        Ok(CityFormOutcome {
            message: format!("The cities list {} has been deleted.", city.label()),
            redirect: Route::Collection,
            city,
        })
    }

    /// Loads a city for display.
    pub fn view(&self, city_id: CityId, actor: &Account) -> Result<City, CityServiceError> {
        self.load_checked(city_id, OPERATION_VIEW, actor)
    }

    /// Builds the collection listing with per-row operations for `actor`.
    pub fn listing(
        &self,
        query: &CityListQuery,
        actor: &Account,
    ) -> Result<CityListing, CityServiceError> {
        let rows = self
            .storage
            .list(query)?
            .into_iter()
            .filter_map(|city| {
                let city_id = city.id?;
                let mut operations = Vec::new();
                if self
                    .access
                    .check_access(OPERATION_UPDATE, &city, actor)
                    .is_allowed()
                {
                    operations.push(OperationLink {
                        key: "edit".to_string(),
                        title: "Edit".to_string(),
                        route: Route::EditForm { city_id },
                    });
                }
                if self
                    .access
                    .check_access(OPERATION_DELETE, &city, actor)
                    .is_allowed()
                {
                    operations.push(OperationLink {
                        key: "delete".to_string(),
                        title: "Delete".to_string(),
                        route: Route::DeleteForm { city_id },
                    });
                }
                Some(CityListRow {
                    id: city_id,
                    name: city.label().to_string(),
                    name_link: Route::EditForm { city_id },
                    operations,
                })
            })
            .collect();

        Ok(CityListing {
            header: vec![
                "Cities List ID".to_string(),
                "Name".to_string(),
                "Operations".to_string(),
            ],
            rows,
        })
    }

    fn load_checked(
        &self,
        city_id: CityId,
        operation: &str,
        actor: &Account,
    ) -> Result<City, CityServiceError> {
        let city = self
            .storage
            .load(city_id)?
            .ok_or(CityServiceError::CityNotFound(city_id))?;
        if !self.access.check_access(operation, &city, actor).is_allowed() {
            return Err(CityServiceError::AccessDenied {
                operation: operation.to_string(),
            });
        }
        Ok(city)
    }
}
