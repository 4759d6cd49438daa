//! Structured error types for sheetdash.
//!
//! Every error is `Clone`: a coalesced sheet fetch hands the same failure to
//! every caller that joined it.

/// All errors that can occur while fetching, caching and writing sheet data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashError {
    /// Transport failure or a non-success HTTP status.
    #[error("Network: {0}")]
    Network(String),

    /// Payload was not well-formed or did not have the expected shape.
    #[error("Decode: {0}")]
    Decode(String),

    /// A join or lookup key had no match. Callers resolve this by defaulting.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A server-assigned identifier was not observed within the retry budget.
    #[error("Identifier {id} not confirmed after {attempts} attempts")]
    ConfirmationTimeout { id: String, attempts: u32 },

    /// Session storage could not be read or written.
    #[error("Session storage: {0}")]
    Storage(String),

    /// A dependent filter was asked for a column it does not describe.
    #[error("Unknown filter column: {0}")]
    UnknownColumn(String),

    /// The current identity may not perform an admin-only action.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid dashboard configuration.
    #[error("Config: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DashError>;

impl From<serde_json::Error> for DashError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<DashError> for wasm_bindgen::JsValue {
    fn from(e: DashError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
