//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage, access policy and formatting into page-level
//!   use-cases (history table, revert/delete confirm forms, CRUD forms).
//! - Keep callers decoupled from SQLite details.

pub mod city_service;
pub mod history;
pub mod revert;
pub mod revision_delete;
pub mod workflow;
