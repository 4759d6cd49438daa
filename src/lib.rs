//! sheetdash - sheet cache and metrics engine for a spreadsheet-backed dashboard
//!
//! The core a browser dashboard calls before it paints anything:
//! - Fetches remote sheets and indexes rows by column title
//! - Caches sheets per key with request coalescing and explicit invalidation
//! - Joins employee and goal sheets into goal bands
//! - Rolls rows up into sums, counts and percentages
//! - Persists and broadcasts the admin scope across pages
//! - Serves dependent filter / search / sort pipelines to every view
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmDashboard } from 'sheetdash';
//! await init();
//! const dash = new WasmDashboard(JSON.stringify({ baseUrl, sheets }));
//! const rows = await dash.rows('powerHours', false);
//! dash.subscribe(event => render(event));
//! ```

// Data and transport
pub mod client;
pub mod columns;
pub mod config;
pub mod error;
pub mod indexer;
pub mod types;

// Cache, aggregation and filters
pub mod admin_filter;
pub mod bus;
pub mod cache;
pub mod dependent_filter;
pub mod goals;
pub mod pipeline;
pub mod rollup;
pub mod session;
pub mod writer;

pub mod dashboard;
pub mod logging;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use dashboard::Dashboard;
pub use error::{DashError, Result};

#[cfg(target_arch = "wasm32")]
pub use wasm::WasmDashboard;

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
