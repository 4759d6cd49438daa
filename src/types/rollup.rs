use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total plus per-group breakdown of one aggregation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupResult {
    pub total: f64,
    pub groups: BTreeMap<String, f64>,
}

impl RollupResult {
    pub fn group(&self, key: &str) -> f64 {
        self.groups.get(key).copied().unwrap_or(0.0)
    }
}
