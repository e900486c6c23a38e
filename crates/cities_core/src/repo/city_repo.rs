//! City revision storage contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist every city save as a revision snapshot keyed by
//!   (city id, revision id), one field row per language variant.
//! - Maintain the per-city default revision pointer.
//! - Answer revision queries (by city, by author, default-language counts).
//!
//! # Invariants
//! - Write paths run `City::pre_save` and `City::validate()` before SQL.
//! - Inserting a revision and repointing the default happen in one
//!   `BEGIN IMMEDIATE` transaction; failures leave the pointer untouched.
//! - The caller's `City` is only updated after a successful commit.
//! - The default revision can never be deleted on its own.

use crate::config::CoreConfig;
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::account::AccountId;
use crate::model::city::{
    Address, City, CityId, CityTranslation, CityValidationError, GeoPoint, RevisionId,
    DEFAULT_FORCED_COUNTRY_CODE, LANGCODE_NOT_SPECIFIED,
};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const FIELD_REVISION_SELECT_SQL: &str = "SELECT
    langcode,
    default_langcode,
    name,
    status,
    user_id,
    created,
    changed,
    pop,
    address,
    country,
    gps_lat,
    gps_lng,
    revision_translation_affected
FROM city_field_revision";

const REQUIRED_TABLES: &[&str] = &["city", "city_revision", "city_field_revision"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from city storage operations.
#[derive(Debug)]
pub enum RepoError {
    /// Field constraints failed; nothing was written.
    Validation(CityValidationError),
    Db(DbError),
    CityNotFound(CityId),
    /// Revision does not exist or belongs to another city.
    RevisionNotFound {
        city_id: CityId,
        revision_id: RevisionId,
    },
    /// The current revision of a city cannot be deleted.
    DefaultRevisionDelete {
        city_id: CityId,
        revision_id: RevisionId,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid city.
    InvalidData(String),
}

impl RepoError {
    /// Whether the error means "resource not found" to page callers.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CityNotFound(_) | Self::RevisionNotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::CityNotFound(id) => write!(f, "city not found: {id}"),
            Self::RevisionNotFound {
                city_id,
                revision_id,
            } => write!(f, "revision {revision_id} of city {city_id} not found"),
            Self::DefaultRevisionDelete {
                city_id,
                revision_id,
            } => write!(
                f,
                "revision {revision_id} is the current revision of city {city_id} and cannot be deleted"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "city storage requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "city storage requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted city data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CityValidationError> for RepoError {
    fn from(value: CityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for the city collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityListQuery {
    /// Filter on the default translation's published flag.
    pub published: Option<bool>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Revision store for cities.
pub trait CityStorage {
    /// Saves `city`, creating the entity on first save.
    ///
    /// Writes a new revision when `city.is_new_revision()`, otherwise
    /// rewrites `city.revision_id` in place. On success `city` carries the
    /// assigned ids and normalized fields.
    fn save(&self, city: &mut City) -> RepoResult<RevisionId>;
    /// Loads the default revision of one city.
    fn load(&self, city_id: CityId) -> RepoResult<Option<City>>;
    /// Loads one revision of one city.
    fn load_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<City>;
    /// Revision ids of one city, ascending.
    fn revision_ids(&self, city_id: CityId) -> RepoResult<Vec<RevisionId>>;
    /// Revision ids authored by `account_id`, ascending.
    fn user_revision_ids(&self, account_id: AccountId) -> RepoResult<Vec<RevisionId>>;
    /// Repoints the default revision of one city.
    fn set_default_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<()>;
    /// Number of revisions carrying a default-language variant.
    fn count_default_language_revisions(&self, city_id: CityId) -> RepoResult<u64>;
    /// Rewrites revision langcode `langcode` to `und`; returns rows changed.
    fn clear_revisions_language(&self, langcode: &str) -> RepoResult<usize>;
    /// Deletes one non-default revision.
    fn delete_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<()>;
    /// Deletes one city with all revisions.
    fn delete(&self, city_id: CityId) -> RepoResult<()>;
    /// Lists cities at their default revision, ordered by id.
    fn list(&self, query: &CityListQuery) -> RepoResult<Vec<City>>;
}

impl<T: CityStorage + ?Sized> CityStorage for &T {
    fn save(&self, city: &mut City) -> RepoResult<RevisionId> {
        (**self).save(city)
    }

    fn load(&self, city_id: CityId) -> RepoResult<Option<City>> {
        (**self).load(city_id)
    }

    fn load_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<City> {
        (**self).load_revision(city_id, revision_id)
    }

    fn revision_ids(&self, city_id: CityId) -> RepoResult<Vec<RevisionId>> {
        (**self).revision_ids(city_id)
    }

    fn user_revision_ids(&self, account_id: AccountId) -> RepoResult<Vec<RevisionId>> {
        (**self).user_revision_ids(account_id)
    }

    fn set_default_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<()> {
        (**self).set_default_revision(city_id, revision_id)
    }

    fn count_default_language_revisions(&self, city_id: CityId) -> RepoResult<u64> {
        (**self).count_default_language_revisions(city_id)
    }

    fn clear_revisions_language(&self, langcode: &str) -> RepoResult<usize> {
        (**self).clear_revisions_language(langcode)
    }

    fn delete_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<()> {
        (**self).delete_revision(city_id, revision_id)
    }

    fn delete(&self, city_id: CityId) -> RepoResult<()> {
        (**self).delete(city_id)
    }

    fn list(&self, query: &CityListQuery) -> RepoResult<Vec<City>> {
        (**self).list(query)
    }
}

/// SQLite-backed city revision store.
pub struct SqliteCityStorage<'conn> {
    conn: &'conn Connection,
    forced_country_code: String,
}

impl<'conn> SqliteCityStorage<'conn> {
    /// Creates storage from a migrated connection with default settings.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_city_connection_ready(conn)?;
        Ok(Self {
            conn,
            forced_country_code: DEFAULT_FORCED_COUNTRY_CODE.to_string(),
        })
    }

    /// Creates storage using site configuration.
    pub fn try_with_config(conn: &'conn Connection, config: &CoreConfig) -> RepoResult<Self> {
        let mut storage = Self::try_new(conn)?;
        storage.forced_country_code = config.forced_country_code.clone();
        Ok(storage)
    }
}

impl CityStorage for SqliteCityStorage<'_> {
    fn save(&self, city: &mut City) -> RepoResult<RevisionId> {
        let started_at = Instant::now();
        let mut draft = city.clone();
        draft.pre_save(&self.forced_country_code);
        draft.validate()?;

        let (city_id, revision_id) = match save_in_transaction(self.conn, &mut draft) {
            Ok(ids) => ids,
            Err(err) => {
                error!(
                    "event=city_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=city_save module=repo status=ok city_id={} revision_id={} new_revision={} default_revision={} duration_ms={}",
            city_id,
            revision_id,
            draft.is_new_revision(),
            draft.is_default_revision(),
            started_at.elapsed().as_millis()
        );

        draft.id = Some(city_id);
        draft.revision_id = Some(revision_id);
        draft.set_new_revision(false);
        *city = draft;
        Ok(revision_id)
    }

    fn load(&self, city_id: CityId) -> RepoResult<Option<City>> {
        match default_revision_id(self.conn, city_id)? {
            Some(Some(revision_id)) => Ok(Some(load_revision_from(
                self.conn,
                city_id,
                revision_id,
            )?)),
            Some(None) | None => Ok(None),
        }
    }

    fn load_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<City> {
        load_revision_from(self.conn, city_id, revision_id)
    }

    fn revision_ids(&self, city_id: CityId) -> RepoResult<Vec<RevisionId>> {
        let mut stmt = self.conn.prepare(
            "SELECT revision_id
             FROM city_revision
             WHERE city_id = ?1
             ORDER BY revision_id ASC;",
        )?;
        let ids = stmt
            .query_map([city_id], |row| row.get::<_, RevisionId>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn user_revision_ids(&self, account_id: AccountId) -> RepoResult<Vec<RevisionId>> {
        let mut stmt = self.conn.prepare(
            "SELECT revision_id
             FROM city_revision
             WHERE revision_user = ?1
             ORDER BY revision_id ASC;",
        )?;
        let ids = stmt
            .query_map([account_id], |row| row.get::<_, RevisionId>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn set_default_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let default_langcode: Option<String> = tx
            .query_row(
                "SELECT f.langcode
                 FROM city_field_revision f
                 INNER JOIN city_revision r ON r.revision_id = f.revision_id
                 WHERE r.revision_id = ?1
                   AND r.city_id = ?2
                   AND f.default_langcode = 1;",
                params![revision_id, city_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(langcode) = default_langcode else {
            return Err(RepoError::RevisionNotFound {
                city_id,
                revision_id,
            });
        };

        tx.execute(
            "UPDATE city SET revision_id = ?1, langcode = ?2 WHERE id = ?3;",
            params![revision_id, langcode, city_id],
        )?;
        tx.commit()?;

        info!(
            "event=city_default_revision module=repo status=ok city_id={} revision_id={}",
            city_id, revision_id
        );
        Ok(())
    }

    fn count_default_language_revisions(&self, city_id: CityId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM city_field_revision
             WHERE city_id = ?1
               AND default_langcode = 1;",
            [city_id],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative revision count `{count}`")))
    }

    fn clear_revisions_language(&self, langcode: &str) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE city_revision SET langcode = ?1 WHERE langcode = ?2;",
            params![LANGCODE_NOT_SPECIFIED, langcode],
        )?;
        info!(
            "event=city_clear_revisions_language module=repo status=ok langcode={} changed={}",
            langcode, changed
        );
        Ok(changed)
    }

    fn delete_revision(&self, city_id: CityId, revision_id: RevisionId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if default_revision_id(&tx, city_id)?.flatten() == Some(revision_id) {
            return Err(RepoError::DefaultRevisionDelete {
                city_id,
                revision_id,
            });
        }

        let changed = tx.execute(
            "DELETE FROM city_revision WHERE revision_id = ?1 AND city_id = ?2;",
            params![revision_id, city_id],
        )?;
        if changed == 0 {
            return Err(RepoError::RevisionNotFound {
                city_id,
                revision_id,
            });
        }
        tx.commit()?;

        info!(
            "event=city_revision_delete module=repo status=ok city_id={} revision_id={}",
            city_id, revision_id
        );
        Ok(())
    }

    fn delete(&self, city_id: CityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM city WHERE id = ?1;", [city_id])?;
        if changed == 0 {
            return Err(RepoError::CityNotFound(city_id));
        }
        info!(
            "event=city_delete module=repo status=ok city_id={}",
            city_id
        );
        Ok(())
    }

    fn list(&self, query: &CityListQuery) -> RepoResult<Vec<City>> {
        let mut sql = String::from("SELECT c.id FROM city c WHERE c.revision_id IS NOT NULL");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(published) = query.published {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM city_field_revision f
                    WHERE f.revision_id = c.revision_id
                      AND f.default_langcode = 1
                      AND f.status = ?
                )",
            );
            bind_values.push(Value::Integer(bool_to_int(published)));
        }

        sql.push_str(" ORDER BY c.id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(bind_values), |row| row.get::<_, CityId>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut cities = Vec::with_capacity(ids.len());
        for city_id in ids {
            if let Some(city) = self.load(city_id)? {
                cities.push(city);
            }
        }
        Ok(cities)
    }
}

fn save_in_transaction(conn: &Connection, draft: &mut City) -> RepoResult<(CityId, RevisionId)> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let (city_id, current_revision) = match draft.id {
        Some(city_id) => match default_revision_id(&tx, city_id)? {
            Some(current) => (city_id, current),
            None => return Err(RepoError::CityNotFound(city_id)),
        },
        None => {
            tx.execute(
                "INSERT INTO city (uuid, langcode) VALUES (?1, ?2);",
                params![draft.uuid.to_string(), draft.default_langcode.as_str()],
            )?;
            (tx.last_insert_rowid(), None)
        }
    };

    let revision_id = if draft.is_new_revision() {
        let previous = match current_revision {
            Some(revision_id) => Some(load_revision_from(&tx, city_id, revision_id)?),
            None => None,
        };
        draft.mark_affected_translations(previous.as_ref());
        insert_revision(&tx, city_id, draft)?
    } else {
        let revision_id = draft.revision_id.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "city {city_id} saved without new revision but has no revision id"
            ))
        })?;
        let stored = load_revision_from(&tx, city_id, revision_id)?;
        merge_affected_translations(draft, &stored);
        update_revision(&tx, city_id, revision_id, draft)?;
        revision_id
    };

    if draft.is_default_revision() {
        tx.execute(
            "UPDATE city SET revision_id = ?1, langcode = ?2 WHERE id = ?3;",
            params![revision_id, draft.default_langcode.as_str(), city_id],
        )?;
    }

    tx.commit()?;
    Ok((city_id, revision_id))
}

/// In-place saves keep earlier affected flags and add changed variants.
fn merge_affected_translations(draft: &mut City, stored: &City) {
    for (langcode, translation) in draft.translations.iter_mut() {
        translation.revision_translation_affected = match stored.translation(langcode) {
            Some(before) => {
                before.revision_translation_affected || !translation.same_content(before)
            }
            None => true,
        };
    }
}

fn insert_revision(conn: &Connection, city_id: CityId, city: &City) -> RepoResult<RevisionId> {
    conn.execute(
        "INSERT INTO city_revision (
            city_id,
            langcode,
            revision_user,
            revision_created,
            revision_log
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            city_id,
            city.default_langcode.as_str(),
            city.revision_author,
            city.revision_created,
            city.revision_log.as_deref(),
        ],
    )?;
    let revision_id = conn.last_insert_rowid();
    insert_field_rows(conn, city_id, revision_id, city)?;
    Ok(revision_id)
}

fn update_revision(
    conn: &Connection,
    city_id: CityId,
    revision_id: RevisionId,
    city: &City,
) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE city_revision
         SET
            langcode = ?1,
            revision_user = ?2,
            revision_created = ?3,
            revision_log = ?4
         WHERE revision_id = ?5
           AND city_id = ?6;",
        params![
            city.default_langcode.as_str(),
            city.revision_author,
            city.revision_created,
            city.revision_log.as_deref(),
            revision_id,
            city_id,
        ],
    )?;
    if changed == 0 {
        return Err(RepoError::RevisionNotFound {
            city_id,
            revision_id,
        });
    }

    conn.execute(
        "DELETE FROM city_field_revision WHERE revision_id = ?1;",
        [revision_id],
    )?;
    insert_field_rows(conn, city_id, revision_id, city)
}

fn insert_field_rows(
    conn: &Connection,
    city_id: CityId,
    revision_id: RevisionId,
    city: &City,
) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO city_field_revision (
            revision_id,
            city_id,
            langcode,
            default_langcode,
            name,
            status,
            user_id,
            created,
            changed,
            pop,
            address,
            country,
            gps_lat,
            gps_lng,
            revision_translation_affected
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
    )?;

    for (langcode, translation) in &city.translations {
        let address = match translation.address.as_ref() {
            Some(address) => Some(serde_json::to_string(address).map_err(|err| {
                RepoError::InvalidData(format!("cannot encode address for `{langcode}`: {err}"))
            })?),
            None => None,
        };
        stmt.execute(params![
            revision_id,
            city_id,
            langcode.as_str(),
            bool_to_int(*langcode == city.default_langcode),
            translation.name.as_str(),
            bool_to_int(translation.published),
            translation.owner_id,
            translation.created,
            translation.changed,
            translation.pop.as_str(),
            address,
            translation.country.as_deref(),
            translation.gps.map(|point| point.lat),
            translation.gps.map(|point| point.lng),
            bool_to_int(translation.revision_translation_affected),
        ])?;
    }

    Ok(())
}

/// `None`: city missing. `Some(None)`: city row without a default revision.
fn default_revision_id(
    conn: &Connection,
    city_id: CityId,
) -> RepoResult<Option<Option<RevisionId>>> {
    let revision_id = conn
        .query_row(
            "SELECT revision_id FROM city WHERE id = ?1;",
            [city_id],
            |row| row.get::<_, Option<RevisionId>>(0),
        )
        .optional()?;
    Ok(revision_id)
}

fn load_revision_from(
    conn: &Connection,
    city_id: CityId,
    revision_id: RevisionId,
) -> RepoResult<City> {
    let not_found = || RepoError::RevisionNotFound {
        city_id,
        revision_id,
    };

    let city_row = conn
        .query_row(
            "SELECT uuid, revision_id FROM city WHERE id = ?1;",
            [city_id],
            |row| {
                Ok((
                    row.get::<_, String>("uuid")?,
                    row.get::<_, Option<RevisionId>>("revision_id")?,
                ))
            },
        )
        .optional()?;
    let Some((uuid_text, current_revision)) = city_row else {
        return Err(not_found());
    };
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in city.uuid"))
    })?;

    let revision_row = conn
        .query_row(
            "SELECT revision_user, revision_created, revision_log
             FROM city_revision
             WHERE revision_id = ?1
               AND city_id = ?2;",
            params![revision_id, city_id],
            |row| {
                Ok((
                    row.get::<_, Option<AccountId>>("revision_user")?,
                    row.get::<_, i64>("revision_created")?,
                    row.get::<_, Option<String>>("revision_log")?,
                ))
            },
        )
        .optional()?;
    let Some((revision_author, revision_created, revision_log)) = revision_row else {
        return Err(not_found());
    };

    let mut stmt = conn.prepare(&format!(
        "{FIELD_REVISION_SELECT_SQL}
         WHERE revision_id = ?1
         ORDER BY langcode ASC;"
    ))?;
    let mut rows = stmt.query([revision_id])?;
    let mut translations = BTreeMap::new();
    let mut default_langcode = None;
    while let Some(row) = rows.next()? {
        let langcode: String = row.get("langcode")?;
        if parse_flag(row, "default_langcode")? {
            default_langcode = Some(langcode.clone());
        }
        translations.insert(langcode, parse_translation_row(row)?);
    }

    let default_langcode = default_langcode.ok_or_else(|| {
        RepoError::InvalidData(format!(
            "revision {revision_id} has no default language variant"
        ))
    })?;

    Ok(City::from_storage(
        city_id,
        uuid,
        revision_id,
        default_langcode,
        revision_author,
        revision_created,
        revision_log,
        translations,
        current_revision == Some(revision_id),
    ))
}

fn parse_translation_row(row: &Row<'_>) -> RepoResult<CityTranslation> {
    let address = match row.get::<_, Option<String>>("address")? {
        Some(raw) => Some(serde_json::from_str::<Address>(&raw).map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid address in city_field_revision.address: {err}"
            ))
        })?),
        None => None,
    };

    let gps = match (
        row.get::<_, Option<f64>>("gps_lat")?,
        row.get::<_, Option<f64>>("gps_lng")?,
    ) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(
                "gps_lat and gps_lng must be both set or both null".to_string(),
            ));
        }
    };

    Ok(CityTranslation {
        name: row.get("name")?,
        published: parse_flag(row, "status")?,
        owner_id: row.get("user_id")?,
        created: row.get("created")?,
        changed: row.get("changed")?,
        pop: row.get("pop")?,
        address,
        country: row.get("country")?,
        gps,
        revision_translation_affected: parse_flag(row, "revision_translation_affected")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in city_field_revision.{column}"
        ))),
    }
}

fn ensure_city_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(*table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
