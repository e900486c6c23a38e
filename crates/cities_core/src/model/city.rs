//! City domain model.
//!
//! # Responsibility
//! - Define one city entity as loaded at one revision, with all of its
//!   language variants.
//! - Apply save-time derivations (owner/revision author defaults, forced
//!   country code) and validate field constraints before persistence.
//!
//! # Invariants
//! - `id` and `revision_id` are assigned by storage and never reused.
//! - Revision metadata (author, creation time, log) is shared by all
//!   translations of one revision.
//! - `default_langcode` always names one entry of `translations` once valid.

use crate::model::account::{AccountId, ANONYMOUS_ACCOUNT_ID};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage-assigned entity identifier.
pub type CityId = i64;
/// Storage-assigned revision identifier, unique across all cities.
pub type RevisionId = i64;

/// Langcode written to revisions whose language was removed.
pub const LANGCODE_NOT_SPECIFIED: &str = "und";
/// Country code forced onto every saved address unless configured otherwise.
pub const DEFAULT_FORCED_COUNTRY_CODE: &str = "US";
/// Maximum name length in characters.
pub const NAME_MAX_LENGTH: usize = 50;
/// Maximum population text length in characters.
pub const POP_MAX_LENGTH: usize = 50;

static LANGCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(-[a-z0-9]+)*$").expect("valid langcode regex"));

/// Returns whether `langcode` has a supported shape (`en`, `pt-br`, `und`).
pub fn is_valid_langcode(langcode: &str) -> bool {
    LANGCODE_RE.is_match(langcode)
}

/// Postal address attached to a city translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country_code: String,
    pub administrative_area: String,
    pub locality: String,
    pub postal_code: String,
    pub address_line1: String,
    pub address_line2: String,
}

/// GPS coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Field values of one language variant within one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityTranslation {
    pub name: String,
    pub published: bool,
    /// `None` until saved; storage defaults it to the anonymous account.
    pub owner_id: Option<AccountId>,
    /// Epoch milliseconds.
    pub created: i64,
    /// Epoch milliseconds. Not part of content comparison.
    pub changed: i64,
    pub pop: String,
    pub address: Option<Address>,
    /// Derived from `address`; see [`City::pre_save`].
    pub country: Option<String>,
    pub gps: Option<GeoPoint>,
    /// Whether this revision changed this language variant.
    pub revision_translation_affected: bool,
}

impl CityTranslation {
    /// Creates a published translation stamped with `now_ms`.
    pub fn new(name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            name: name.into(),
            published: true,
            owner_id: None,
            created: now_ms,
            changed: now_ms,
            pop: String::new(),
            address: None,
            country: None,
            gps: None,
            revision_translation_affected: true,
        }
    }

    /// Compares editable content, ignoring `changed` and the affected flag.
    pub fn same_content(&self, other: &Self) -> bool {
        self.name == other.name
            && self.published == other.published
            && self.owner_id == other.owner_id
            && self.created == other.created
            && self.pop == other.pop
            && self.address == other.address
            && self.country == other.country
            && self.gps == other.gps
    }
}

/// One city entity loaded at one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// `None` until the first save.
    pub id: Option<CityId>,
    pub uuid: Uuid,
    /// `None` until the first save.
    pub revision_id: Option<RevisionId>,
    /// Original language of the entity.
    pub default_langcode: String,
    pub revision_author: Option<AccountId>,
    /// Epoch milliseconds.
    pub revision_created: i64,
    pub revision_log: Option<String>,
    pub translations: BTreeMap<String, CityTranslation>,
    default_revision: bool,
    new_revision: bool,
}

impl City {
    /// Creates an unsaved city with a single translation.
    ///
    /// # Invariants
    /// - The first save always produces a new default revision.
    pub fn new(langcode: impl Into<String>, name: impl Into<String>, now_ms: i64) -> Self {
        let langcode = langcode.into();
        let mut translations = BTreeMap::new();
        translations.insert(langcode.clone(), CityTranslation::new(name, now_ms));
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            revision_id: None,
            default_langcode: langcode,
            revision_author: None,
            revision_created: now_ms,
            revision_log: None,
            translations,
            default_revision: true,
            new_revision: true,
        }
    }

    /// Rebuilds a persisted revision. Used by storage read paths.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_storage(
        id: CityId,
        uuid: Uuid,
        revision_id: RevisionId,
        default_langcode: String,
        revision_author: Option<AccountId>,
        revision_created: i64,
        revision_log: Option<String>,
        translations: BTreeMap<String, CityTranslation>,
        default_revision: bool,
    ) -> Self {
        Self {
            id: Some(id),
            uuid,
            revision_id: Some(revision_id),
            default_langcode,
            revision_author,
            revision_created,
            revision_log,
            translations,
            default_revision,
            new_revision: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Name of the default translation.
    pub fn label(&self) -> &str {
        self.default_translation()
            .map(|translation| translation.name.as_str())
            .unwrap_or("")
    }

    pub fn default_translation(&self) -> Option<&CityTranslation> {
        self.translations.get(&self.default_langcode)
    }

    pub fn default_translation_mut(&mut self) -> Option<&mut CityTranslation> {
        self.translations.get_mut(&self.default_langcode)
    }

    pub fn translation(&self, langcode: &str) -> Option<&CityTranslation> {
        self.translations.get(langcode)
    }

    pub fn translation_mut(&mut self, langcode: &str) -> Option<&mut CityTranslation> {
        self.translations.get_mut(langcode)
    }

    pub fn has_translation(&self, langcode: &str) -> bool {
        self.translations.contains_key(langcode)
    }

    /// Adds or replaces one language variant.
    pub fn add_translation(&mut self, langcode: impl Into<String>, translation: CityTranslation) {
        self.translations.insert(langcode.into(), translation);
    }

    /// Langcodes of all variants, sorted.
    pub fn translation_languages(&self) -> Vec<&str> {
        self.translations.keys().map(String::as_str).collect()
    }

    /// Whether more than one language variant exists.
    pub fn has_translations(&self) -> bool {
        self.translations.len() > 1
    }

    /// Published flag of the default translation.
    pub fn is_published(&self) -> bool {
        self.default_translation()
            .map(|translation| translation.published)
            .unwrap_or(false)
    }

    pub fn owner_id(&self) -> Option<AccountId> {
        self.default_translation()
            .and_then(|translation| translation.owner_id)
    }

    /// Requests (or cancels) a new revision on the next save.
    pub fn set_new_revision(&mut self, value: bool) {
        self.new_revision = value;
    }

    pub fn is_new_revision(&self) -> bool {
        self.new_revision || self.is_new()
    }

    /// Marks whether the next saved revision becomes the current one.
    pub fn set_default_revision(&mut self, value: bool) {
        self.default_revision = value;
    }

    pub fn is_default_revision(&self) -> bool {
        self.default_revision
    }

    /// Applies save-time field derivations.
    ///
    /// # Invariants
    /// - Every address carries `forced_country_code`, mirrored to `country`.
    /// - Every translation has an owner (anonymous when unset).
    /// - Revision author defaults to the default translation owner.
    pub fn pre_save(&mut self, forced_country_code: &str) {
        for translation in self.translations.values_mut() {
            if let Some(address) = translation.address.as_mut() {
                address.country_code = forced_country_code.to_string();
                translation.country = Some(forced_country_code.to_string());
            }
            if translation.owner_id.is_none() {
                translation.owner_id = Some(ANONYMOUS_ACCOUNT_ID);
            }
        }

        if self.revision_author.is_none() {
            self.revision_author = Some(self.owner_id().unwrap_or(ANONYMOUS_ACCOUNT_ID));
        }
    }

    /// Sets `revision_translation_affected` on every variant relative to
    /// `previous` (the revision being superseded).
    ///
    /// # Invariants
    /// - New or changed variants are affected.
    /// - At least the default variant is affected.
    pub fn mark_affected_translations(&mut self, previous: Option<&City>) {
        let mut any_affected = false;
        for (langcode, translation) in self.translations.iter_mut() {
            let affected = match previous.and_then(|city| city.translation(langcode)) {
                Some(before) => !translation.same_content(before),
                None => true,
            };
            translation.revision_translation_affected = affected;
            any_affected |= affected;
        }

        if !any_affected {
            if let Some(translation) = self.default_translation_mut() {
                translation.revision_translation_affected = true;
            }
        }
    }

    /// Validates field constraints of every translation.
    pub fn validate(&self) -> Result<(), CityValidationError> {
        if self.translations.is_empty() {
            return Err(CityValidationError::MissingTranslations);
        }
        if !self.translations.contains_key(&self.default_langcode) {
            return Err(CityValidationError::DefaultTranslationMissing(
                self.default_langcode.clone(),
            ));
        }

        for (langcode, translation) in &self.translations {
            if !is_valid_langcode(langcode) {
                return Err(CityValidationError::InvalidLangcode(langcode.clone()));
            }
            if translation.name.trim().is_empty() {
                return Err(CityValidationError::EmptyName {
                    langcode: langcode.clone(),
                });
            }
            let name_length = translation.name.chars().count();
            if name_length > NAME_MAX_LENGTH {
                return Err(CityValidationError::NameTooLong {
                    langcode: langcode.clone(),
                    length: name_length,
                });
            }
            let pop_length = translation.pop.chars().count();
            if pop_length > POP_MAX_LENGTH {
                return Err(CityValidationError::PopTooLong {
                    langcode: langcode.clone(),
                    length: pop_length,
                });
            }
            if let Some(point) = translation.gps {
                if !point.is_valid() {
                    return Err(CityValidationError::InvalidCoordinates {
                        langcode: langcode.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Field constraint violations reported before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityValidationError {
    MissingTranslations,
    DefaultTranslationMissing(String),
    InvalidLangcode(String),
    EmptyName { langcode: String },
    NameTooLong { langcode: String, length: usize },
    PopTooLong { langcode: String, length: usize },
    InvalidCoordinates { langcode: String },
}

impl Display for CityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTranslations => write!(f, "city must have at least one translation"),
            Self::DefaultTranslationMissing(langcode) => {
                write!(f, "default translation `{langcode}` is missing")
            }
            Self::InvalidLangcode(langcode) => write!(f, "invalid langcode `{langcode}`"),
            Self::EmptyName { langcode } => write!(f, "name is required ({langcode})"),
            Self::NameTooLong { langcode, length } => write!(
                f,
                "name cannot be longer than {NAME_MAX_LENGTH} characters but is currently {length} characters long ({langcode})"
            ),
            Self::PopTooLong { langcode, length } => write!(
                f,
                "pop cannot be longer than {POP_MAX_LENGTH} characters but is currently {length} characters long ({langcode})"
            ),
            Self::InvalidCoordinates { langcode } => {
                write!(f, "gps coordinates are out of range ({langcode})")
            }
        }
    }
}

impl Error for CityValidationError {}
