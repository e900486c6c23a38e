//! Revision history assembly and historical revision views.
//!
//! # Responsibility
//! - Build the declarative revision history table of one city in one
//!   language variant, most recent first.
//! - Provide the title and content of a single historical revision page.
//!
//! # Invariants
//! - Assembly is read-only; the same store state yields the same table.
//! - Only revisions that exist in, and affected, the requested language
//!   variant produce rows.
//! - Exactly the first produced row is current and it carries no links.

use crate::access::policy::RevisionPermissions;
use crate::datetime::{DateFormatter, DateStyle};
use crate::model::account::{AccountDirectory, ANONYMOUS_ACCOUNT_ID};
use crate::model::city::{City, CityId, RevisionId};
use crate::repo::city_repo::{CityStorage, RepoError, RepoResult};
use crate::routing::Route;
use log::debug;
use serde::Serialize;

/// Label shown in the operations cell of the current row.
pub const CURRENT_REVISION_LABEL: &str = "Current revision";
/// CSS class attached to the current row.
pub const CURRENT_ROW_CLASS: &str = "revision-current";

const HEADER_REVISION: &str = "Revision";
const HEADER_OPERATIONS: &str = "Operations";

/// Declarative revision history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionHistory {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<RevisionRow>,
}

/// One row of the revision history table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionRow {
    pub revision_id: RevisionId,
    pub revision: RevisionCell,
    pub operations: OperationsCell,
    pub classes: Vec<String>,
}

impl RevisionRow {
    pub fn is_current(&self) -> bool {
        matches!(self.operations, OperationsCell::Current { .. })
    }

    /// Link keys in the operations cell, e.g. `["revert", "delete"]`.
    pub fn link_keys(&self) -> Vec<&str> {
        match &self.operations {
            OperationsCell::Current { .. } => Vec::new(),
            OperationsCell::Links(links) => links.iter().map(|link| link.key.as_str()).collect(),
        }
    }
}

/// Primary cell: date (linked), author and log message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionCell {
    pub date: String,
    pub date_link: Route,
    pub author: String,
    /// Revision log message; empty when none was recorded.
    pub message: String,
}

impl RevisionCell {
    /// `"<date> by <author>"`.
    pub fn label(&self) -> String {
        format!("{} by {}", self.date, self.author)
    }
}

/// Operations cell content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OperationsCell {
    Current { label: String },
    Links(Vec<OperationLink>),
}

/// One action link in the operations cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationLink {
    pub key: String,
    pub title: String,
    pub route: Route,
}

/// Builds revision history tables and historical revision pages.
pub struct RevisionHistoryAssembler<S, F, D> {
    storage: S,
    formatter: F,
    accounts: D,
}

impl<S, F, D> RevisionHistoryAssembler<S, F, D>
where
    S: CityStorage,
    F: DateFormatter,
    D: AccountDirectory,
{
    pub fn new(storage: S, formatter: F, accounts: D) -> Self {
        Self {
            storage,
            formatter,
            accounts,
        }
    }

    /// Builds the history table of `city` (its default revision) for the
    /// `langcode` variant.
    ///
    /// # Errors
    /// - `RepoError::InvalidData` when `city` was never saved.
    /// - Storage errors while loading revisions.
    pub fn assemble(
        &self,
        city: &City,
        langcode: &str,
        permissions: RevisionPermissions,
    ) -> RepoResult<RevisionHistory> {
        let city_id = city.id.ok_or_else(|| {
            RepoError::InvalidData("unsaved city has no revision history".to_string())
        })?;
        let has_translations = city.has_translations();
        let label = city
            .translation(langcode)
            .map(|translation| translation.name.as_str())
            .unwrap_or_else(|| city.label());
        let title = if has_translations {
            format!("{langcode} revisions for {label}")
        } else {
            format!("Revisions for {label}")
        };

        let mut rows = Vec::new();
        for revision_id in self.storage.revision_ids(city_id)?.into_iter().rev() {
            let revision = self.storage.load_revision(city_id, revision_id)?;
            let affected = revision
                .translation(langcode)
                .map(|translation| translation.revision_translation_affected)
                .unwrap_or(false);
            if !affected {
                continue;
            }

            let date = self
                .formatter
                .format(revision.revision_created, DateStyle::Short);
            let date_link = if Some(revision_id) == city.revision_id {
                Route::Canonical { city_id }
            } else {
                Route::Revision {
                    city_id,
                    revision_id,
                }
            };
            let cell = RevisionCell {
                date,
                date_link,
                author: self.accounts.display_name(
                    revision
                        .revision_author
                        .unwrap_or(ANONYMOUS_ACCOUNT_ID),
                ),
                message: revision.revision_log.clone().unwrap_or_default(),
            };

            let row = if rows.is_empty() {
                RevisionRow {
                    revision_id,
                    revision: cell,
                    operations: OperationsCell::Current {
                        label: CURRENT_REVISION_LABEL.to_string(),
                    },
                    classes: vec![CURRENT_ROW_CLASS.to_string()],
                }
            } else {
                RevisionRow {
                    revision_id,
                    revision: cell,
                    operations: OperationsCell::Links(historical_links(
                        city_id,
                        revision_id,
                        langcode,
                        has_translations,
                        permissions,
                    )),
                    classes: Vec::new(),
                }
            };
            rows.push(row);
        }

        debug!(
            "event=revision_history module=service status=ok city_id={} langcode={} rows={}",
            city_id,
            langcode,
            rows.len()
        );

        Ok(RevisionHistory {
            title,
            header: vec![HEADER_REVISION.to_string(), HEADER_OPERATIONS.to_string()],
            rows,
        })
    }

    /// `"Revision of <label> from <date>"`.
    pub fn revision_page_title(
        &self,
        city_id: CityId,
        revision_id: RevisionId,
    ) -> RepoResult<String> {
        let revision = self.storage.load_revision(city_id, revision_id)?;
        Ok(format!(
            "Revision of {} from {}",
            revision.label(),
            self.formatter
                .format(revision.revision_created, DateStyle::Medium)
        ))
    }

    /// Loads one historical revision for display.
    pub fn revision_show(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<City> {
        self.storage.load_revision(city_id, revision_id)
    }
}

fn historical_links(
    city_id: CityId,
    revision_id: RevisionId,
    langcode: &str,
    has_translations: bool,
    permissions: RevisionPermissions,
) -> Vec<OperationLink> {
    let mut links = Vec::new();
    if permissions.can_revert {
        let route = if has_translations {
            Route::TranslationRevert {
                city_id,
                revision_id,
                langcode: langcode.to_string(),
            }
        } else {
            Route::RevisionRevert {
                city_id,
                revision_id,
            }
        };
        links.push(OperationLink {
            key: "revert".to_string(),
            title: "Revert".to_string(),
            route,
        });
    }
    if permissions.can_delete {
        links.push(OperationLink {
            key: "delete".to_string(),
            title: "Delete".to_string(),
            route: Route::RevisionDelete {
                city_id,
                revision_id,
            },
        });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::{historical_links, RevisionCell};
    use crate::access::policy::RevisionPermissions;
    use crate::routing::Route;

    #[test]
    fn revert_link_targets_translation_route_only_with_translations() {
        let all = RevisionPermissions {
            can_revert: true,
            can_delete: true,
        };
        let single = historical_links(1, 2, "en", false, all);
        assert_eq!(single.len(), 2);
        assert_eq!(
            single[0].route,
            Route::RevisionRevert {
                city_id: 1,
                revision_id: 2
            }
        );
        assert_eq!(
            single[1].route,
            Route::RevisionDelete {
                city_id: 1,
                revision_id: 2
            }
        );

        let translated = historical_links(1, 2, "fr", true, all);
        assert_eq!(
            translated[0].route,
            Route::TranslationRevert {
                city_id: 1,
                revision_id: 2,
                langcode: "fr".to_string()
            }
        );
    }

    #[test]
    fn links_follow_permission_flags() {
        let none = historical_links(1, 2, "en", false, RevisionPermissions::default());
        assert!(none.is_empty());

        let delete_only = historical_links(
            1,
            2,
            "en",
            false,
            RevisionPermissions {
                can_revert: false,
                can_delete: true,
            },
        );
        assert_eq!(delete_only.len(), 1);
        assert_eq!(delete_only[0].key, "delete");
    }

    #[test]
    fn cell_label_joins_date_and_author() {
        let cell = RevisionCell {
            date: "03/05/2024 - 14:30".to_string(),
            date_link: Route::Canonical { city_id: 1 },
            author: "editor".to_string(),
            message: String::new(),
        };
        assert_eq!(cell.label(), "03/05/2024 - 14:30 by editor");
    }
}
