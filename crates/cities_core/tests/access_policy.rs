use cities_core::access::policy::{
    PERMISSION_ADD, PERMISSION_ADMINISTER, PERMISSION_DELETE, PERMISSION_DELETE_REVISIONS,
    PERMISSION_EDIT, PERMISSION_REVERT_REVISIONS, PERMISSION_VIEW_PUBLISHED,
    PERMISSION_VIEW_REVISIONS, PERMISSION_VIEW_UNPUBLISHED,
};
use cities_core::db::open_db_in_memory;
use cities_core::{
    Account, AccessChecker, City, CityAccessControlHandler, CityInput, CityService,
    CityServiceError, CityStorage, FixedClock, RevisionOptions, SqliteCityStorage,
};

const ALL_PERMISSIONS: [&str; 9] = [
    PERMISSION_VIEW_PUBLISHED,
    PERMISSION_VIEW_UNPUBLISHED,
    PERMISSION_ADD,
    PERMISSION_EDIT,
    PERMISSION_DELETE,
    PERMISSION_VIEW_REVISIONS,
    PERMISSION_REVERT_REVISIONS,
    PERMISSION_DELETE_REVISIONS,
    PERMISSION_ADMINISTER,
];

const T0: i64 = 1_709_649_000_000;

/// Every subset of the known permissions, as accounts.
fn all_accounts() -> Vec<Account> {
    (0u32..(1 << ALL_PERMISSIONS.len()))
        .map(|mask| {
            let mut account = Account::new(i64::from(mask) + 1, format!("user{mask}"));
            for (bit, permission) in ALL_PERMISSIONS.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    account.grant(permission);
                }
            }
            account
        })
        .collect()
}

fn city(published: bool) -> City {
    let mut city = City::new("en", "Springfield", T0);
    city.default_translation_mut().unwrap().published = published;
    city
}

#[test]
fn update_is_never_allowed_without_edit_permission() {
    let handler = CityAccessControlHandler::new();
    for account in all_accounts()
        .into_iter()
        .filter(|account| !account.has_permission(PERMISSION_EDIT))
    {
        for published in [true, false] {
            assert!(
                !handler
                    .check_access("update", &city(published), &account)
                    .is_allowed(),
                "{} must not update",
                account.name
            );
        }
    }
}

#[test]
fn published_view_follows_view_published_permission() {
    let handler = CityAccessControlHandler::new();
    let published = city(true);
    for account in all_accounts() {
        assert_eq!(
            handler.check_access("view", &published, &account).is_allowed(),
            account.has_permission(PERMISSION_VIEW_PUBLISHED),
            "{}",
            account.name
        );
    }
}

#[test]
fn unpublished_view_follows_view_unpublished_permission() {
    let handler = CityAccessControlHandler::new();
    let unpublished = city(false);
    for account in all_accounts() {
        assert_eq!(
            handler
                .check_access("view", &unpublished, &account)
                .is_allowed(),
            account.has_permission(PERMISSION_VIEW_UNPUBLISHED),
            "{}",
            account.name
        );
    }
}

#[test]
fn missing_permission_is_forbidden_not_neutral() {
    let handler = CityAccessControlHandler::new();
    let anonymous = Account::anonymous();

    assert!(handler.check_access("view", &city(true), &anonymous).is_forbidden());
    assert!(handler.check_access("view", &city(false), &anonymous).is_forbidden());
    assert!(handler.check_access("delete", &city(true), &anonymous).is_forbidden());
    assert!(handler.check_create_access(&anonymous).is_forbidden());
    assert!(handler
        .check_access("archive", &city(true), &anonymous)
        .is_neutral());
}

#[test]
fn service_denies_update_without_touching_storage() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteCityStorage::try_new(&conn).unwrap();
    let mut city = City::new("en", "Springfield", T0);
    storage.save(&mut city).unwrap();
    let city_id = city.id.unwrap();

    let service = CityService::new(
        &storage,
        CityAccessControlHandler::new(),
        FixedClock(T0 + 1_000),
        "en",
    );
    let viewer = Account::new(5, "viewer").with_permission(PERMISSION_VIEW_PUBLISHED);

    let err = service
        .update(
            city_id,
            &CityInput::new("Shelbyville"),
            &viewer,
            &RevisionOptions::default(),
        )
        .unwrap_err();
    match err {
        CityServiceError::AccessDenied { operation } => assert_eq!(operation, "update"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(storage.revision_ids(city_id).unwrap().len(), 1);
    assert_eq!(storage.load(city_id).unwrap().unwrap().label(), "Springfield");

    let err = service.create(&CityInput::new("Ogdenville"), &viewer).unwrap_err();
    assert!(matches!(err, CityServiceError::AccessDenied { .. }));
}
