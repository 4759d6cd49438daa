//! Test fixtures: an in-memory sheet API and an instant sleeper.
//!
//! `MockSource` serves sheets built from `Row`s, counts fetches per sheet id,
//! can fail on demand, and records writes. Written rows can be made to show
//! a server-assigned id only after a number of further fetches, which drives
//! the write-confirmation poll.
//!
//! # Example
//!
//! ```rust
//! let source = MockSource::new().with_sheet("goals", &["Level", "Min", "Max"], rows);
//! let cache = SheetCache::new(source.clone());
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;

use sheetdash::client::{SheetSource, Sleeper, WriteAck};
use sheetdash::{DashError, RawSheet, Result, Row, Value};

/// Column the mock server fills with an id for written rows.
pub const ID_COLUMN: &str = "ID";

#[derive(Debug, Clone, Default)]
struct MockSheet {
    titles: Vec<String>,
    rows: Vec<Row>,
}

impl MockSheet {
    fn to_raw(&self, id: &str) -> RawSheet {
        RawSheet::from_values(
            id,
            &self.titles,
            self.rows.iter().map(|row| {
                self.titles
                    .iter()
                    .map(|t| row.get(t).cloned().unwrap_or_default())
                    .collect::<Vec<Value>>()
            }),
        )
    }
}

/// A written row still waiting for its id.
#[derive(Debug, Clone)]
struct PendingId {
    sheet: String,
    index: usize,
    /// Fetches that still return the row without an id
    remaining: u32,
}

#[derive(Debug, Clone)]
pub struct WriteCall {
    pub sheet: String,
    pub rows: Vec<Row>,
    pub to_top: bool,
}

#[derive(Default)]
pub struct MockSource {
    sheets: RefCell<HashMap<String, MockSheet>>,
    fetches: RefCell<HashMap<String, usize>>,
    failing: RefCell<HashSet<String>>,
    writes: RefCell<Vec<WriteCall>>,
    pending_ids: RefCell<Vec<PendingId>>,
    /// `None`: written rows never get an id
    id_delay: Cell<Option<u32>>,
    reject_writes: Cell<bool>,
    next_id: Cell<u32>,
}

impl MockSource {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn with_sheet(self: Rc<Self>, id: &str, titles: &[&str], rows: Vec<Row>) -> Rc<Self> {
        self.set_sheet(id, titles, rows);
        self
    }

    pub fn set_sheet(&self, id: &str, titles: &[&str], rows: Vec<Row>) {
        self.sheets.borrow_mut().insert(
            id.to_string(),
            MockSheet {
                titles: titles.iter().map(|t| (*t).to_string()).collect(),
                rows,
            },
        );
    }

    /// Replace the rows of an existing sheet, keeping its titles.
    pub fn replace_rows(&self, id: &str, rows: Vec<Row>) {
        if let Some(sheet) = self.sheets.borrow_mut().get_mut(id) {
            sheet.rows = rows;
        }
    }

    pub fn set_failing(&self, id: &str, failing: bool) {
        if failing {
            self.failing.borrow_mut().insert(id.to_string());
        } else {
            self.failing.borrow_mut().remove(id);
        }
    }

    /// Written rows show an id after `fetches` further fetches (0: the next one).
    pub fn assign_ids_after(&self, fetches: u32) {
        self.id_delay.set(Some(fetches));
    }

    pub fn never_assign_ids(&self) {
        self.id_delay.set(None);
    }

    pub fn reject_writes(&self) {
        self.reject_writes.set(true);
    }

    pub fn fetch_count(&self, id: &str) -> usize {
        self.fetches.borrow().get(id).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.borrow().values().sum()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.borrow().clone()
    }

    fn reveal_ids(&self, id: &str) {
        let mut sheets = self.sheets.borrow_mut();
        let mut pending = self.pending_ids.borrow_mut();
        pending.retain_mut(|p| {
            if p.sheet != id {
                return true;
            }
            if p.remaining > 0 {
                p.remaining -= 1;
                return true;
            }
            let next = self.next_id.get() + 1;
            self.next_id.set(next);
            if let Some(row) = sheets.get_mut(id).and_then(|s| s.rows.get_mut(p.index)) {
                row.insert(ID_COLUMN, format!("R-{next}"));
            }
            false
        });
    }
}

impl SheetSource for MockSource {
    fn fetch_sheet<'a>(&'a self, sheet_id: &'a str) -> LocalBoxFuture<'a, Result<RawSheet>> {
        async move {
            *self.fetches.borrow_mut().entry(sheet_id.to_string()).or_insert(0) += 1;
            // Let concurrent callers reach the cache while this fetch is open.
            tokio::task::yield_now().await;

            if self.failing.borrow().contains(sheet_id) {
                return Err(DashError::Network(format!("{sheet_id}: 503")));
            }
            self.reveal_ids(sheet_id);
            self.sheets
                .borrow()
                .get(sheet_id)
                .map(|s| s.to_raw(sheet_id))
                .ok_or_else(|| DashError::Network(format!("{sheet_id}: 404")))
        }
        .boxed_local()
    }

    fn add_rows<'a>(
        &'a self,
        sheet_id: &'a str,
        rows: &'a [Row],
        to_top: bool,
    ) -> LocalBoxFuture<'a, Result<WriteAck>> {
        async move {
            tokio::task::yield_now().await;
            self.writes.borrow_mut().push(WriteCall {
                sheet: sheet_id.to_string(),
                rows: rows.to_vec(),
                to_top,
            });
            if self.reject_writes.get() {
                return Ok(WriteAck {
                    ok: false,
                    ids: Vec::new(),
                });
            }

            let mut sheets = self.sheets.borrow_mut();
            let sheet = sheets
                .get_mut(sheet_id)
                .ok_or_else(|| DashError::Network(format!("{sheet_id}: 404")))?;
            for row in rows {
                let index = if to_top {
                    sheet.rows.insert(0, row.clone());
                    0
                } else {
                    sheet.rows.push(row.clone());
                    sheet.rows.len() - 1
                };
                if let Some(remaining) = self.id_delay.get() {
                    self.pending_ids.borrow_mut().push(PendingId {
                        sheet: sheet_id.to_string(),
                        index,
                        remaining,
                    });
                }
            }
            Ok(WriteAck {
                ok: true,
                ids: Vec::new(),
            })
        }
        .boxed_local()
    }
}

/// Sleeper that returns immediately and records every requested delay.
#[derive(Default)]
pub struct InstantSleeper {
    pub slept: RefCell<Vec<Duration>>,
}

impl InstantSleeper {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.slept.borrow().len()
    }
}

impl Sleeper for InstantSleeper {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        self.slept.borrow_mut().push(duration);
        async {}.boxed_local()
    }
}

// ============================================================================
// Sheet builders
// ============================================================================

pub const EMPLOYEE_TITLES: &[&str] = &["Employee ID", "Employee Name", "Level"];
pub const GOAL_TITLES: &[&str] = &["Level", "Min", "Max"];
pub const HOURS_TITLES: &[&str] = &["Employee ID", "Employee Name", "Activity", "Hours", "Month"];

pub fn employee(id: &str, name: &str, level: &str) -> Row {
    Row::new()
        .with("Employee ID", id)
        .with("Employee Name", name)
        .with("Level", level)
}

pub fn goal(level: &str, min: f64, max: f64) -> Row {
    Row::new().with("Level", level).with("Min", min).with("Max", max)
}

pub fn hours(id: &str, name: &str, activity: &str, hours: f64, month: &str) -> Row {
    Row::new()
        .with("Employee ID", id)
        .with("Employee Name", name)
        .with("Activity", activity)
        .with("Hours", hours)
        .with("Month", month)
}
