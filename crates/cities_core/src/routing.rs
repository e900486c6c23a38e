//! Link targets produced by history tables, listings and workflows.
//!
//! Routes are data only; serving them is the caller's concern.

use crate::model::city::{CityId, RevisionId};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/admin/structure/city_entity";

/// Named link target with its route parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Collection,
    AddForm,
    Canonical {
        city_id: CityId,
    },
    EditForm {
        city_id: CityId,
    },
    DeleteForm {
        city_id: CityId,
    },
    VersionHistory {
        city_id: CityId,
    },
    Revision {
        city_id: CityId,
        revision_id: RevisionId,
    },
    RevisionRevert {
        city_id: CityId,
        revision_id: RevisionId,
    },
    RevisionDelete {
        city_id: CityId,
        revision_id: RevisionId,
    },
    TranslationRevert {
        city_id: CityId,
        revision_id: RevisionId,
        langcode: String,
    },
}

impl Route {
    /// Stable route name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Collection => "entity.city_entity.collection",
            Self::AddForm => "entity.city_entity.add_form",
            Self::Canonical { .. } => "entity.city_entity.canonical",
            Self::EditForm { .. } => "entity.city_entity.edit_form",
            Self::DeleteForm { .. } => "entity.city_entity.delete_form",
            Self::VersionHistory { .. } => "entity.city_entity.version_history",
            Self::Revision { .. } => "entity.city_entity.revision",
            Self::RevisionRevert { .. } => "entity.city_entity.revision_revert",
            Self::RevisionDelete { .. } => "entity.city_entity.revision_delete",
            Self::TranslationRevert { .. } => "entity.city_entity.translation_revert",
        }
    }

    /// Path with all parameters substituted.
    pub fn path(&self) -> String {
        match self {
            Self::Collection => BASE_PATH.to_string(),
            Self::AddForm => format!("{BASE_PATH}/add"),
            Self::Canonical { city_id } => format!("{BASE_PATH}/{city_id}"),
            Self::EditForm { city_id } => format!("{BASE_PATH}/{city_id}/edit"),
            Self::DeleteForm { city_id } => format!("{BASE_PATH}/{city_id}/delete"),
            Self::VersionHistory { city_id } => format!("{BASE_PATH}/{city_id}/revisions"),
            Self::Revision {
                city_id,
                revision_id,
            } => format!("{BASE_PATH}/{city_id}/revisions/{revision_id}/view"),
            Self::RevisionRevert {
                city_id,
                revision_id,
            } => format!("{BASE_PATH}/{city_id}/revisions/{revision_id}/revert"),
            Self::RevisionDelete {
                city_id,
                revision_id,
            } => format!("{BASE_PATH}/{city_id}/revisions/{revision_id}/delete"),
            Self::TranslationRevert {
                city_id,
                revision_id,
                langcode,
            } => format!("{BASE_PATH}/{city_id}/revisions/{revision_id}/revert/{langcode}"),
        }
    }
}
