//! Remote sheet transport.
//!
//! [`SheetSource`] is the seam between the cache and the network. The browser
//! build talks to the sheet API through `fetch` ([`HttpSheetClient`]); tests
//! and native tools plug in their own sources.

mod http;
mod timer;

use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{RawSheet, Row};

pub use http::{rows_url, sheet_url, HttpSheetClient};
pub use timer::{Sleeper, SystemSleeper};

/// Server acknowledgement for a row write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
    #[serde(default = "default_ok")]
    pub ok: bool,
    /// Server-assigned identifiers, when the API reports them synchronously
    #[serde(default)]
    pub ids: Vec<String>,
}

fn default_ok() -> bool {
    true
}

/// Source of raw sheets and sink for new rows.
///
/// Futures are `!Send`: everything runs on the single browser thread.
pub trait SheetSource {
    /// Fetch one sheet. No caching happens here.
    ///
    /// # Errors
    /// `Network` when the transport fails or returns a non-success status,
    /// `Decode` when the payload is malformed.
    fn fetch_sheet<'a>(&'a self, sheet_id: &'a str) -> LocalBoxFuture<'a, Result<RawSheet>>;

    /// Append `rows` to a sheet. `to_top` asks the server to insert them first
    /// (best-effort, server-dependent).
    ///
    /// # Errors
    /// `Network` or `Decode`, as for [`SheetSource::fetch_sheet`].
    fn add_rows<'a>(
        &'a self,
        sheet_id: &'a str,
        rows: &'a [Row],
        to_top: bool,
    ) -> LocalBoxFuture<'a, Result<WriteAck>>;
}

/// Body of `POST {base}/sheet/{id}/rows`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddRowsBody<'a> {
    pub to_top: bool,
    pub rows: &'a [Row],
}
