//! Acting account model.
//!
//! # Responsibility
//! - Carry the identity and granted permission names of the acting user.
//! - Resolve revision author ids into display names for history rows.
//!
//! # Invariants
//! - Account id `0` is the anonymous account.
//! - Permission checks are exact string membership tests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Stable user account identifier.
pub type AccountId = i64;

/// Account id used when no owner has been set explicitly.
pub const ANONYMOUS_ACCOUNT_ID: AccountId = 0;

const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// Acting user with its granted permission names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub permissions: BTreeSet<String>,
}

impl Account {
    /// Creates an account without any permission.
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: BTreeSet::new(),
        }
    }

    /// Anonymous account without permissions.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_ACCOUNT_ID, ANONYMOUS_DISPLAY_NAME)
    }

    /// Builder-style permission grant.
    pub fn with_permission(mut self, permission: &str) -> Self {
        self.grant(permission);
        self
    }

    pub fn grant(&mut self, permission: &str) {
        self.permissions.insert(permission.to_string());
    }

    pub fn revoke(&mut self, permission: &str) {
        self.permissions.remove(permission);
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_ACCOUNT_ID
    }
}

/// Resolves account ids into user-facing names.
pub trait AccountDirectory {
    /// Returns the display name for `id`; unknown ids still yield a label.
    fn display_name(&self, id: AccountId) -> String;
}

/// In-memory account directory.
#[derive(Debug, Clone, Default)]
pub struct StaticAccountDirectory {
    names: HashMap<AccountId, String>,
}

impl StaticAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or renames) one account.
    pub fn insert(&mut self, id: AccountId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// Registers every account in `accounts`.
    pub fn from_accounts<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        let mut directory = Self::new();
        for account in accounts {
            directory.insert(account.id, account.name.clone());
        }
        directory
    }
}

impl AccountDirectory for StaticAccountDirectory {
    fn display_name(&self, id: AccountId) -> String {
        if let Some(name) = self.names.get(&id) {
            return name.clone();
        }
        if id == ANONYMOUS_ACCOUNT_ID {
            return ANONYMOUS_DISPLAY_NAME.to_string();
        }
        format!("user {id}")
    }
}
