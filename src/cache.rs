//! Per-sheet row cache with request coalescing.
//!
//! Entries hold the full indexed row set of a sheet. They are refreshed only
//! by an explicit `force` or [`SheetCache::invalidate`]; nothing expires on
//! its own. While a fetch for a key is in flight every caller, forced or not,
//! joins that fetch instead of issuing a second request. This holds across
//! invalidation too: there is never more than one fetch per key.

use futures_util::future::{LocalBoxFuture, Shared};
use futures_util::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::bus::EventBus;
use crate::client::SheetSource;
use crate::error::Result;
use crate::indexer;
use crate::types::{DashEvent, Row};

/// Indexed rows shared between the cache and its readers.
pub type Rows = Rc<[Row]>;

type PendingFetch = Shared<LocalBoxFuture<'static, Result<Rows>>>;

/// The fetch currently running for a key.
struct InFlight {
    seq: u64,
    pending: PendingFetch,
    /// Cleared by invalidation: the result still reaches its waiters but is
    /// not stored
    commit: bool,
}

/// Cached state for one sheet key.
#[derive(Default)]
struct CacheEntry {
    rows: Option<Rows>,
    /// Milliseconds since the Unix epoch of the last committed fetch
    fetched_at: Option<f64>,
    in_flight: Option<InFlight>,
}

impl CacheEntry {
    /// Forget cached rows. Returns false when nothing is left to keep.
    fn invalidate(&mut self) -> bool {
        self.rows = None;
        self.fetched_at = None;
        match &mut self.in_flight {
            Some(flight) => {
                flight.commit = false;
                true
            }
            None => false,
        }
    }
}

type EntryTable = RefCell<HashMap<String, CacheEntry>>;

pub struct SheetCache {
    source: Rc<dyn SheetSource>,
    /// Logical sheet key → remote sheet id
    sheet_ids: HashMap<String, String>,
    entries: Rc<EntryTable>,
    bus: Option<Rc<EventBus>>,
    next_seq: Cell<u64>,
}

impl SheetCache {
    pub fn new(source: Rc<dyn SheetSource>) -> Self {
        Self {
            source,
            sheet_ids: HashMap::new(),
            entries: Rc::new(RefCell::new(HashMap::new())),
            bus: None,
            next_seq: Cell::new(0),
        }
    }

    /// Map logical keys (`"employees"`) to remote sheet ids.
    #[must_use]
    pub fn with_sheet_ids(mut self, sheet_ids: HashMap<String, String>) -> Self {
        self.sheet_ids = sheet_ids;
        self
    }

    /// Publish `SheetRefreshed` on `bus` after every committed fetch.
    #[must_use]
    pub fn with_bus(mut self, bus: Rc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Remote id for a logical key. Unknown keys are used verbatim.
    pub fn sheet_id<'a>(&'a self, key: &'a str) -> &'a str {
        self.sheet_ids.get(key).map_or(key, String::as_str)
    }

    /// Rows for `key`.
    ///
    /// Returns the cached rows unless `force` is set or nothing is cached. A
    /// fetch already in flight is joined, even by a forced call; a caller that
    /// needs data newer than that fetch must await it and force again.
    ///
    /// # Errors
    /// Propagates `Network`/`Decode` failures of the underlying fetch to every
    /// caller that joined it. Previously cached rows are kept on failure.
    pub async fn get(&self, key: &str, force: bool) -> Result<Rows> {
        let pending = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries.entry(key.to_string()).or_default();
            if let Some(flight) = &entry.in_flight {
                log::debug!("sheet cache: joining in-flight fetch for {key}");
                flight.pending.clone()
            } else if let (false, Some(rows)) = (force, &entry.rows) {
                log::debug!("sheet cache: hit for {key}");
                return Ok(Rc::clone(rows));
            } else {
                let seq = self.next_seq.get() + 1;
                self.next_seq.set(seq);
                log::debug!("sheet cache: fetching {key} (force={force}, seq={seq})");
                let pending = self.start_fetch(key, seq);
                entry.in_flight = Some(InFlight {
                    seq,
                    pending: pending.clone(),
                    commit: true,
                });
                pending
            }
        };
        pending.await
    }

    fn start_fetch(&self, key: &str, seq: u64) -> PendingFetch {
        let source = Rc::clone(&self.source);
        let entries = Rc::downgrade(&self.entries);
        let bus = self.bus.as_ref().map(Rc::downgrade);
        let sheet_id = self.sheet_id(key).to_string();
        let key = key.to_string();

        let pending = async move {
            let result = source
                .fetch_sheet(&sheet_id)
                .await
                .map(|raw| Rows::from(indexer::index(&raw)));
            if let Err(e) = &result {
                log::warn!("sheet cache: fetch of {key} ({sheet_id}) failed: {e}");
            }
            if commit(&entries, &key, seq, &result) {
                if let Some(bus) = bus.as_ref().and_then(Weak::upgrade) {
                    bus.publish(&DashEvent::SheetRefreshed { sheet: key });
                }
            }
            result
        }
        .boxed_local()
        .shared();

        // Drive the fetch to completion even if every caller stops awaiting it.
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(pending.clone().map(|_| ()));

        pending
    }

    /// Cached rows without fetching.
    pub fn peek(&self, key: &str) -> Option<Rows> {
        self.entries
            .borrow()
            .get(key)
            .and_then(|e| e.rows.as_ref().map(Rc::clone))
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.entries
            .borrow()
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    /// When `key` was last fetched, in milliseconds since the Unix epoch.
    pub fn fetched_at(&self, key: &str) -> Option<f64> {
        self.entries.borrow().get(key).and_then(|e| e.fetched_at)
    }

    /// Drop the cached rows for `key`; the next `get` fetches again.
    ///
    /// A fetch in flight stays the only fetch for the key: callers arriving
    /// before it finishes join it and get its rows, but those rows are not
    /// stored. Returns false when nothing was cached or in flight.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        if !entry.invalidate() {
            entries.remove(key);
        }
        log::debug!("sheet cache: invalidated {key}");
        true
    }

    /// Drop every entry (logout). Fetches in flight finish uncommitted.
    pub fn invalidate_all(&self) {
        self.entries.borrow_mut().retain(|_, entry| entry.invalidate());
    }

    /// Invalidate by logical key or by remote sheet id. Returns the number of
    /// entries dropped.
    pub fn clear_cache(&self, key_or_id: &str) -> usize {
        let mut keys: Vec<String> = self
            .sheet_ids
            .iter()
            .filter(|(_, id)| id.as_str() == key_or_id)
            .map(|(key, _)| key.clone())
            .collect();
        keys.push(key_or_id.to_string());
        keys.iter().filter(|key| self.invalidate(key)).count()
    }
}

/// Store a finished fetch if its entry still expects it. Returns true when
/// new rows were committed.
fn commit(entries: &Weak<EntryTable>, key: &str, seq: u64, result: &Result<Rows>) -> bool {
    let Some(entries) = entries.upgrade() else {
        return false;
    };
    let mut entries = entries.borrow_mut();
    let Some(entry) = entries.get_mut(key) else {
        return false;
    };
    let commit = match &entry.in_flight {
        Some(flight) if flight.seq == seq => flight.commit,
        _ => return false,
    };
    entry.in_flight = None;
    if !commit {
        if entry.rows.is_none() {
            entries.remove(key);
        }
        return false;
    }
    match result {
        Ok(rows) => {
            entry.rows = Some(Rc::clone(rows));
            entry.fetched_at = Some(now_ms());
            true
        }
        Err(_) => false,
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
