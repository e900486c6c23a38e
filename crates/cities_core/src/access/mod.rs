//! Access control for city entities and their revisions.
//!
//! # Responsibility
//! - Map (operation, publication state, actor permissions) to a decision.
//! - Expose the permission names the policy checks against.
//!
//! # Invariants
//! - Checks are pure: no storage access, no logging, no side effects.
//! - Unknown operations resolve to `AccessResult::Neutral`, never an error.

pub mod policy;
