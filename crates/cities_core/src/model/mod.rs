//! Domain model for revisioned, translatable cities.
//!
//! # Invariants
//! - Every city is identified by a stable storage id and UUID.
//! - Revisions are immutable snapshots; edits and reverts add new ones.

pub mod account;
pub mod city;
