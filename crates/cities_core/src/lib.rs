//! Core domain logic for the Cities List entity.
//! This crate owns revision storage, access policy, revision history and
//! revert workflows for city records.

pub mod access;
pub mod config;
pub mod datetime;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod routing;
pub mod service;

pub use access::policy::{
    AccessChecker, AccessResult, CityAccessControlHandler, RevisionOperation,
    RevisionPermissions,
};
pub use config::{ConfigError, CoreConfig};
pub use datetime::{ChronoDateFormatter, Clock, DateFormatter, DateStyle, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::account::{
    Account, AccountDirectory, AccountId, StaticAccountDirectory, ANONYMOUS_ACCOUNT_ID,
};
pub use model::city::{
    Address, City, CityId, CityTranslation, CityValidationError, GeoPoint, RevisionId,
};
pub use repo::city_repo::{
    CityListQuery, CityStorage, RepoError, RepoResult, SqliteCityStorage,
};
pub use routing::Route;
pub use service::city_service::{
    CityFormOutcome, CityInput, CityListing, CityService, CityServiceError, RevisionOptions,
};
pub use service::history::{OperationsCell, RevisionHistory, RevisionHistoryAssembler, RevisionRow};
pub use service::revert::{RevisionRevertForm, TranslationRevertForm};
pub use service::revision_delete::RevisionDeleteForm;
pub use service::workflow::{Confirmation, WorkflowError, WorkflowOutcome};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
