use serde::{Deserialize, Serialize};

/// Persisted sentinel meaning "no scope restriction".
pub const ALL_SCOPE: &str = "__ALL__";

/// Admin filter state: everyone, or a single employee by display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum Scope {
    #[default]
    All,
    Employee(String),
}

impl Scope {
    /// Parse a stored or user-selected value. The sentinel and blank input mean `All`.
    pub fn from_stored(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_SCOPE {
            Scope::All
        } else {
            Scope::Employee(trimmed.to_string())
        }
    }

    pub fn as_stored(&self) -> &str {
        match self {
            Scope::All => ALL_SCOPE,
            Scope::Employee(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Scope::All)
    }
}
