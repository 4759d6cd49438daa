use serde::{Deserialize, Serialize};

use super::Scope;

/// Kind of record a write created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Squad,
    SquadMember,
    Activity,
    Payout,
    Other,
}

/// Notifications published on the dashboard event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum DashEvent {
    /// The admin scope changed; carries the new value.
    ScopeChanged { scope: Scope },
    /// A write succeeded and the touched sheets were invalidated.
    EntityAdded {
        kind: EntityKind,
        sheet: String,
        label: String,
    },
    /// A sheet was re-fetched from the remote API.
    SheetRefreshed { sheet: String },
}
