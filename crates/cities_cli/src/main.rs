//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `cities_core` linkage.
//! - Exercise one create/history round trip against an in-memory store, or
//!   against the database file given as the first argument.

use cities_core::access::policy::{PERMISSION_ADD, PERMISSION_VIEW_REVISIONS};
use cities_core::db::{open_db, open_db_in_memory};
use cities_core::{
    Account, ChronoDateFormatter, CityAccessControlHandler, CityInput, CityService,
    RevisionHistoryAssembler, RevisionPermissions, SqliteCityStorage, StaticAccountDirectory,
    SystemClock,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("cities_core ping={}", cities_core::ping());
    println!("cities_core version={}", cities_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(rows) => {
            println!("cities_core history_rows={rows}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cities_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<usize, Box<dyn Error>> {
    let conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let storage = SqliteCityStorage::try_new(&conn)?;
    let policy = CityAccessControlHandler::new();
    let actor = Account::new(1, "cli")
        .with_permission(PERMISSION_ADD)
        .with_permission(PERMISSION_VIEW_REVISIONS);

    let created = CityService::new(&storage, policy, SystemClock, "en")
        .create(&CityInput::new("Springfield"), &actor)?;
    let history = RevisionHistoryAssembler::new(
        &storage,
        ChronoDateFormatter::utc(),
        StaticAccountDirectory::from_accounts([&actor]),
    )
    .assemble(
        &created.city,
        &created.city.default_langcode,
        RevisionPermissions::for_account(&policy, &actor),
    )?;
    Ok(history.rows.len())
}
