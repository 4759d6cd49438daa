//! Session-scoped persistence: identity, resolved goal level, admin scope.
//!
//! In the browser the values live in `sessionStorage`, so they survive page
//! navigation and vanish with the tab. Everything is removed together on
//! logout.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(target_arch = "wasm32")]
use crate::error::DashError;

pub const EMPLOYEE_ID_KEY: &str = "employeeId";
pub const DISPLAY_NAME_KEY: &str = "displayName";
pub const RESOLVED_LEVEL_KEY: &str = "resolvedLevel";
pub const ADMIN_SCOPE_KEY: &str = "adminFilterScope";

const SESSION_KEYS: [&str; 4] = [
    EMPLOYEE_ID_KEY,
    DISPLAY_NAME_KEY,
    RESOLVED_LEVEL_KEY,
    ADMIN_SCOPE_KEY,
];

/// String key/value store with session lifetime.
pub trait SessionStore {
    /// # Errors
    /// `Storage` when the backing store is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// # Errors
    /// `Storage` when the backing store is unavailable or full.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// # Errors
    /// `Storage` when the backing store is unavailable.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store for native builds and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// `window.sessionStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSessionStore;

#[cfg(target_arch = "wasm32")]
impl BrowserSessionStore {
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.session_storage().ok().flatten())
            .ok_or_else(|| DashError::Storage("sessionStorage unavailable".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| DashError::Storage(format!("read {key}: {e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| DashError::Storage(format!("write {key}: {e:?}")))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| DashError::Storage(format!("remove {key}: {e:?}")))
    }
}

/// Who is logged in. Issued elsewhere; this crate only reads and clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub employee_id: String,
    pub display_name: String,
}

/// Typed access to the session keys.
pub struct Session {
    store: Box<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn identity(&self) -> Option<Identity> {
        let employee_id = self.read(EMPLOYEE_ID_KEY)?;
        let display_name = self.read(DISPLAY_NAME_KEY).unwrap_or_default();
        Some(Identity {
            employee_id,
            display_name,
        })
    }

    /// # Errors
    /// `Storage` when the store rejects the write.
    pub fn set_identity(&self, identity: &Identity) -> Result<()> {
        self.store.set(EMPLOYEE_ID_KEY, &identity.employee_id)?;
        self.store.set(DISPLAY_NAME_KEY, &identity.display_name)
    }

    pub fn resolved_level(&self) -> Option<String> {
        self.read(RESOLVED_LEVEL_KEY)
    }

    /// # Errors
    /// `Storage` when the store rejects the write.
    pub fn set_resolved_level(&self, level: &str) -> Result<()> {
        self.store.set(RESOLVED_LEVEL_KEY, level)
    }

    /// Raw persisted admin scope, if any.
    pub fn admin_scope(&self) -> Option<String> {
        self.read(ADMIN_SCOPE_KEY)
    }

    /// # Errors
    /// `Storage` when the store rejects the write.
    pub fn set_admin_scope(&self, value: &str) -> Result<()> {
        self.store.set(ADMIN_SCOPE_KEY, value)
    }

    /// Remove every session key. All keys are attempted; the first failure is returned.
    ///
    /// # Errors
    /// `Storage` when any removal fails.
    pub fn logout(&self) -> Result<()> {
        let mut first_err = None;
        for key in SESSION_KEYS {
            if let Err(e) = self.store.remove(key) {
                log::warn!("session: could not clear {key}: {e}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Missing, blank and unreadable values all read as `None`.
    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(v) => v.filter(|s| !s.trim().is_empty()),
            Err(e) => {
                log::warn!("session: {e}");
                None
            }
        }
    }
}

/// Decides whether the current identity may use admin features.
pub trait Authorizer {
    fn is_admin(&self, identity: Option<&Identity>) -> bool;
}

/// Allowlist of employee ids (case-insensitive, trimmed).
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    ids: HashSet<String>,
}

impl Allowlist {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl Authorizer for Allowlist {
    fn is_admin(&self, identity: Option<&Identity>) -> bool {
        identity.is_some_and(|id| {
            self.ids
                .contains(&id.employee_id.trim().to_lowercase())
        })
    }
}
