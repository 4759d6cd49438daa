//! Dashboard configuration, loaded from JSON at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::columns;
use crate::error::{DashError, Result};

/// Bounded polling for server-assigned identifiers after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    6
}

fn default_interval_ms() -> u64 {
    1500
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl ConfirmationPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Root of the sheet API, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// Logical sheet key → remote sheet id
    #[serde(default)]
    pub sheets: HashMap<String, String>,
    /// Goal min used when a goal row has no usable minimum
    #[serde(default)]
    pub goal_floor: f64,
    #[serde(default)]
    pub confirmation: ConfirmationPolicy,
    /// Columns probed, in order, when narrowing rows to the admin scope
    #[serde(default = "default_scope_columns")]
    pub scope_columns: Vec<String>,
    /// Employee ids allowed to set the admin scope
    #[serde(default)]
    pub admins: Vec<String>,
}

fn default_scope_columns() -> Vec<String> {
    columns::EMPLOYEE_NAME
        .iter()
        .take(3)
        .map(|s| (*s).to_string())
        .collect()
}

impl DashboardConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sheets: HashMap::new(),
            goal_floor: 0.0,
            confirmation: ConfirmationPolicy::default(),
            scope_columns: default_scope_columns(),
            admins: Vec::new(),
        }
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    /// `Decode` for malformed JSON, `Config` for invalid values.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: DashboardConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// `Config` when the base URL is blank, no poll attempt is allowed, or
    /// the goal floor is not finite.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(DashError::Config("baseUrl must not be empty".to_string()));
        }
        if self.confirmation.max_attempts == 0 {
            return Err(DashError::Config(
                "confirmation.maxAttempts must be at least 1".to_string(),
            ));
        }
        if !self.goal_floor.is_finite() {
            return Err(DashError::Config("goalFloor must be finite".to_string()));
        }
        Ok(())
    }

    pub fn scope_columns(&self) -> Vec<&str> {
        self.scope_columns.iter().map(String::as_str).collect()
    }
}
