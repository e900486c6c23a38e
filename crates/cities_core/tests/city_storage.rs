use cities_core::db::open_db_in_memory;
use cities_core::{
    Address, City, CityListQuery, CityStorage, CityTranslation, CityValidationError, CoreConfig,
    GeoPoint, RepoError, SqliteCityStorage,
};

const T0: i64 = 1_709_649_000_000;

#[test]
fn save_and_load_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    {
        let translation = city.default_translation_mut().unwrap();
        translation.pop = "30,720".to_string();
        translation.gps = Some(GeoPoint {
            lat: 39.78,
            lng: -89.65,
        });
        translation.owner_id = Some(7);
    }
    let revision_id = storage.save(&mut city).unwrap();

    let city_id = city.id.unwrap();
    assert_eq!(city.revision_id, Some(revision_id));
    assert!(!city.is_new_revision());

    let loaded = storage.load(city_id).unwrap().unwrap();
    assert_eq!(loaded.uuid, city.uuid);
    assert_eq!(loaded.revision_id, Some(revision_id));
    assert_eq!(loaded.label(), "Springfield");
    assert_eq!(loaded.owner_id(), Some(7));
    assert_eq!(loaded.revision_author, Some(7));
    assert_eq!(loaded.revision_created, T0);
    assert!(loaded.is_default_revision());

    let translation = loaded.default_translation().unwrap();
    assert_eq!(translation.pop, "30,720");
    assert_eq!(
        translation.gps,
        Some(GeoPoint {
            lat: 39.78,
            lng: -89.65
        })
    );
    assert!(translation.revision_translation_affected);
}

#[test]
fn load_missing_city_returns_none_and_missing_revision_errors() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    assert!(storage.load(42).unwrap().is_none());

    let err = storage.load_revision(42, 1).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        RepoError::RevisionNotFound {
            city_id: 42,
            revision_id: 1
        }
    ));
}

#[test]
fn revision_of_another_city_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut first = City::new("en", "Springfield", T0);
    let first_revision = storage.save(&mut first).unwrap();
    let mut second = City::new("en", "Shelbyville", T0);
    storage.save(&mut second).unwrap();

    let err = storage
        .load_revision(second.id.unwrap(), first_revision)
        .unwrap_err();
    assert!(matches!(err, RepoError::RevisionNotFound { .. }));
}

#[test]
fn validation_failure_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "   ", T0);
    let err = storage.save(&mut city).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(CityValidationError::EmptyName { .. })
    ));
    assert!(city.is_new());
    assert!(city.revision_author.is_none());
    assert!(storage.list(&CityListQuery::default()).unwrap().is_empty());

    let mut long_name = City::new("en", "x".repeat(51), T0);
    let err = storage.save(&mut long_name).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(CityValidationError::NameTooLong { length: 51, .. })
    ));
}

#[test]
fn new_revisions_get_increasing_ids_and_old_revisions_stay_intact() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    let first = storage.save(&mut city).unwrap();

    city.default_translation_mut().unwrap().name = "Springfield, IL".to_string();
    city.set_new_revision(true);
    city.revision_created = T0 + 60_000;
    let second = storage.save(&mut city).unwrap();

    assert!(second > first);
    let city_id = city.id.unwrap();
    assert_eq!(storage.revision_ids(city_id).unwrap(), vec![first, second]);

    let old = storage.load_revision(city_id, first).unwrap();
    assert_eq!(old.label(), "Springfield");
    assert!(!old.is_default_revision());

    let current = storage.load(city_id).unwrap().unwrap();
    assert_eq!(current.revision_id, Some(second));
    assert_eq!(current.label(), "Springfield, IL");
}

#[test]
fn save_without_new_revision_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    let revision_id = storage.save(&mut city).unwrap();

    city.default_translation_mut().unwrap().pop = "116,250".to_string();
    let rewritten = storage.save(&mut city).unwrap();

    assert_eq!(rewritten, revision_id);
    let city_id = city.id.unwrap();
    assert_eq!(storage.revision_ids(city_id).unwrap(), vec![revision_id]);
    let loaded = storage.load(city_id).unwrap().unwrap();
    assert_eq!(loaded.default_translation().unwrap().pop, "116,250");
}

#[test]
fn unchanged_translation_is_not_marked_affected() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    city.add_translation("fr", CityTranslation::new("Springfield (fr)", T0));
    storage.save(&mut city).unwrap();

    city.translation_mut("fr").unwrap().pop = "30 720".to_string();
    city.set_new_revision(true);
    let second = storage.save(&mut city).unwrap();

    let revision = storage.load_revision(city.id.unwrap(), second).unwrap();
    assert!(revision.translation("fr").unwrap().revision_translation_affected);
    assert!(!revision.translation("en").unwrap().revision_translation_affected);
}

#[test]
fn address_country_is_forced_on_save() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    city.default_translation_mut().unwrap().address = Some(Address {
        country_code: "CA".to_string(),
        locality: "Springfield".to_string(),
        ..Address::default()
    });
    storage.save(&mut city).unwrap();

    let loaded = storage.load(city.id.unwrap()).unwrap().unwrap();
    let translation = loaded.default_translation().unwrap();
    assert_eq!(translation.address.as_ref().unwrap().country_code, "US");
    assert_eq!(translation.address.as_ref().unwrap().locality, "Springfield");
    assert_eq!(translation.country.as_deref(), Some("US"));
}

#[test]
fn configured_forced_country_is_used() {
    let conn = open_db_in_memory().unwrap();
    let config = CoreConfig {
        forced_country_code: "FR".to_string(),
        ..CoreConfig::default()
    };
    let storage = SqliteCityStorage::try_with_config(&conn, &config).unwrap();

    let mut city = City::new("fr", "Lyon", T0);
    city.default_translation_mut().unwrap().address = Some(Address::default());
    storage.save(&mut city).unwrap();

    assert_eq!(city.default_translation().unwrap().country.as_deref(), Some("FR"));
}

#[test]
fn user_revision_ids_lists_revisions_by_author() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    city.revision_author = Some(3);
    let first = storage.save(&mut city).unwrap();

    city.set_new_revision(true);
    city.revision_author = Some(4);
    city.default_translation_mut().unwrap().pop = "1".to_string();
    storage.save(&mut city).unwrap();

    city.set_new_revision(true);
    city.revision_author = Some(3);
    city.default_translation_mut().unwrap().pop = "2".to_string();
    let third = storage.save(&mut city).unwrap();

    assert_eq!(storage.user_revision_ids(3).unwrap(), vec![first, third]);
    assert!(storage.user_revision_ids(99).unwrap().is_empty());
}

#[test]
fn default_language_revisions_are_counted_per_city() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    city.add_translation("fr", CityTranslation::new("Springfield (fr)", T0));
    storage.save(&mut city).unwrap();
    city.set_new_revision(true);
    city.default_translation_mut().unwrap().pop = "1".to_string();
    storage.save(&mut city).unwrap();

    let mut other = City::new("en", "Shelbyville", T0);
    storage.save(&mut other).unwrap();

    assert_eq!(
        storage
            .count_default_language_revisions(city.id.unwrap())
            .unwrap(),
        2
    );
    assert_eq!(
        storage
            .count_default_language_revisions(other.id.unwrap())
            .unwrap(),
        1
    );
}

#[test]
fn clear_revisions_language_rewrites_to_undefined() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("de", "Springfeld", T0);
    storage.save(&mut city).unwrap();
    city.set_new_revision(true);
    city.default_translation_mut().unwrap().pop = "1".to_string();
    storage.save(&mut city).unwrap();
    let mut english = City::new("en", "Springfield", T0);
    storage.save(&mut english).unwrap();

    assert_eq!(storage.clear_revisions_language("de").unwrap(), 2);
    assert_eq!(storage.clear_revisions_language("de").unwrap(), 0);

    let undefined: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM city_revision WHERE langcode = 'und';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(undefined, 2);
}

#[test]
fn set_default_revision_repoints_current() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    let first = storage.save(&mut city).unwrap();
    city.set_new_revision(true);
    city.default_translation_mut().unwrap().name = "Capital City".to_string();
    storage.save(&mut city).unwrap();

    let city_id = city.id.unwrap();
    storage.set_default_revision(city_id, first).unwrap();
    let current = storage.load(city_id).unwrap().unwrap();
    assert_eq!(current.revision_id, Some(first));
    assert_eq!(current.label(), "Springfield");

    let err = storage.set_default_revision(city_id, 999).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn default_revision_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    let first = storage.save(&mut city).unwrap();
    city.set_new_revision(true);
    city.default_translation_mut().unwrap().pop = "1".to_string();
    let second = storage.save(&mut city).unwrap();
    let city_id = city.id.unwrap();

    let err = storage.delete_revision(city_id, second).unwrap_err();
    assert!(matches!(err, RepoError::DefaultRevisionDelete { .. }));
    assert_eq!(storage.revision_ids(city_id).unwrap(), vec![first, second]);

    storage.delete_revision(city_id, first).unwrap();
    assert_eq!(storage.revision_ids(city_id).unwrap(), vec![second]);
    assert!(storage.load_revision(city_id, first).unwrap_err().is_not_found());

    let err = storage.delete_revision(city_id, first).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn deleting_city_removes_all_revisions() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    let mut city = City::new("en", "Springfield", T0);
    storage.save(&mut city).unwrap();
    city.set_new_revision(true);
    city.default_translation_mut().unwrap().pop = "1".to_string();
    storage.save(&mut city).unwrap();
    let city_id = city.id.unwrap();

    storage.delete(city_id).unwrap();
    assert!(storage.load(city_id).unwrap().is_none());
    assert!(storage.revision_ids(city_id).unwrap().is_empty());

    let field_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM city_field_revision;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(field_rows, 0);

    assert!(matches!(
        storage.delete(city_id).unwrap_err(),
        RepoError::CityNotFound(_)
    ));
}

#[test]
fn list_filters_on_published_and_pages() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();

    for (name, published) in [
        ("Springfield", true),
        ("Shelbyville", false),
        ("Capital City", true),
    ] {
        let mut city = City::new("en", name, T0);
        city.default_translation_mut().unwrap().published = published;
        storage.save(&mut city).unwrap();
    }

    let all = storage.list(&CityListQuery::default()).unwrap();
    let names: Vec<&str> = all.iter().map(City::label).collect();
    assert_eq!(names, vec!["Springfield", "Shelbyville", "Capital City"]);

    let published = storage
        .list(&CityListQuery {
            published: Some(true),
            ..CityListQuery::default()
        })
        .unwrap();
    let names: Vec<&str> = published.iter().map(City::label).collect();
    assert_eq!(names, vec!["Springfield", "Capital City"]);

    let paged = storage
        .list(&CityListQuery {
            published: None,
            limit: Some(1),
            offset: 1,
        })
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].label(), "Shelbyville");
}
