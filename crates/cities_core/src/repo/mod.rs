//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the revision store contract used by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `City::validate()` before persistence.
//! - Repository APIs return semantic errors (`CityNotFound`,
//!   `RevisionNotFound`) in addition to DB transport errors.

pub mod city_repo;
