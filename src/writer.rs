//! Row creation with server-assigned id confirmation.
//!
//! After a write the sheet is re-fetched (forced) until the new row shows up
//! with an identifier, or the attempt budget runs out. Running out is a
//! partial success, not an error: the row exists, its id just has not been
//! observed yet.

use std::rc::Rc;

use serde::Deserialize;

use crate::bus::EventBus;
use crate::cache::SheetCache;
use crate::columns;
use crate::client::{SheetSource, Sleeper};
use crate::config::ConfirmationPolicy;
use crate::error::{DashError, Result};
use crate::indexer::first_non_empty;
use crate::types::{DashEvent, EntityKind, Row};

/// How to recognize the created row and read its server-assigned id.
pub struct Confirmation {
    /// Alias columns holding the id, probed in order
    pub id_columns: Vec<String>,
    matches: Box<dyn Fn(&Row) -> bool>,
}

impl Confirmation {
    pub fn new(id_columns: &[&str], matches: impl Fn(&Row) -> bool + 'static) -> Self {
        Self {
            id_columns: id_columns.iter().map(|s| (*s).to_string()).collect(),
            matches: Box::new(matches),
        }
    }

    /// Match on one column's trimmed text.
    pub fn by_field(id_columns: &[&str], column: &str, value: &str) -> Self {
        let column = column.to_string();
        let value = value.trim().to_string();
        Self::new(id_columns, move |row| row.text(&column).trim() == value)
    }

    /// Id of the first matching row that already carries one.
    fn find_id(&self, rows: &[Row]) -> Option<String> {
        let aliases: Vec<&str> = self.id_columns.iter().map(String::as_str).collect();
        rows.iter()
            .filter(|row| (self.matches)(*row))
            .find_map(|row| first_non_empty(row, &aliases))
            .map(|v| v.as_text().trim().to_string())
    }
}

/// Serializable form of [`Confirmation::by_field`], as sent from JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub match_column: String,
    pub match_value: String,
    /// Defaults to the employee id aliases
    #[serde(default)]
    pub id_columns: Vec<String>,
}

impl ConfirmRequest {
    pub fn into_confirmation(self) -> Confirmation {
        let id_columns: Vec<&str> = if self.id_columns.is_empty() {
            columns::EMPLOYEE_ID.to_vec()
        } else {
            self.id_columns.iter().map(String::as_str).collect()
        };
        Confirmation::by_field(&id_columns, &self.match_column, &self.match_value)
    }
}

/// A write request.
pub struct NewRecord {
    /// Cache key of the sheet receiving the rows
    pub sheet: String,
    pub rows: Vec<Row>,
    pub to_top: bool,
    pub kind: EntityKind,
    /// Human-readable label carried by the `EntityAdded` notification
    pub label: String,
    /// Other cache keys the write makes stale
    pub also_invalidates: Vec<String>,
    pub confirmation: Option<Confirmation>,
}

impl NewRecord {
    pub fn new(sheet: &str, kind: EntityKind, label: &str, rows: Vec<Row>) -> Self {
        Self {
            sheet: sheet.to_string(),
            rows,
            to_top: false,
            kind,
            label: label.to_string(),
            also_invalidates: Vec::new(),
            confirmation: None,
        }
    }

    #[must_use]
    pub fn to_top(mut self) -> Self {
        self.to_top = true;
        self
    }

    #[must_use]
    pub fn invalidating(mut self, key: &str) -> Self {
        self.also_invalidates.push(key.to_string());
        self
    }

    #[must_use]
    pub fn confirm_with(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = Some(confirmation);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written; no confirmation was requested.
    Written,
    /// Written and the server-assigned id was observed.
    Confirmed { id: String, attempts: u32 },
    /// Written, but the id did not appear within the attempt budget.
    Unconfirmed { attempts: u32 },
}

impl WriteOutcome {
    pub fn is_confirmed(&self) -> bool {
        !matches!(self, WriteOutcome::Unconfirmed { .. })
    }

    /// Strict view: an unconfirmed write becomes `ConfirmationTimeout`.
    ///
    /// # Errors
    /// `ConfirmationTimeout` for [`WriteOutcome::Unconfirmed`].
    pub fn into_result(self, label: &str) -> Result<Option<String>> {
        match self {
            WriteOutcome::Written => Ok(None),
            WriteOutcome::Confirmed { id, .. } => Ok(Some(id)),
            WriteOutcome::Unconfirmed { attempts } => Err(DashError::ConfirmationTimeout {
                id: label.to_string(),
                attempts,
            }),
        }
    }
}

pub struct RowWriter {
    source: Rc<dyn SheetSource>,
    cache: Rc<SheetCache>,
    bus: Rc<EventBus>,
    sleeper: Rc<dyn Sleeper>,
    policy: ConfirmationPolicy,
}

impl RowWriter {
    pub fn new(
        source: Rc<dyn SheetSource>,
        cache: Rc<SheetCache>,
        bus: Rc<EventBus>,
        sleeper: Rc<dyn Sleeper>,
        policy: ConfirmationPolicy,
    ) -> Self {
        Self {
            source,
            cache,
            bus,
            sleeper,
            policy,
        }
    }

    /// Write `record`, confirm it if requested, then invalidate the touched
    /// sheets. `EntityAdded` is published only when the write is complete
    /// (written without confirmation, or confirmed).
    ///
    /// # Errors
    /// `Network`/`Decode` from the write itself, or `Network` when the server
    /// rejects it. The cache is left untouched in that case.
    pub async fn create(&self, record: NewRecord) -> Result<WriteOutcome> {
        let sheet_id = self.cache.sheet_id(&record.sheet).to_string();
        let ack = self
            .source
            .add_rows(&sheet_id, &record.rows, record.to_top)
            .await?;
        if !ack.ok {
            return Err(DashError::Network(format!(
                "server rejected {} row(s) for {}",
                record.rows.len(),
                record.sheet
            )));
        }

        let outcome = match &record.confirmation {
            Some(confirmation) => self.poll(&record.sheet, confirmation).await,
            None => WriteOutcome::Written,
        };

        self.cache.invalidate(&record.sheet);
        for key in &record.also_invalidates {
            self.cache.invalidate(key);
        }

        match &outcome {
            WriteOutcome::Unconfirmed { attempts } => {
                log::warn!(
                    "{} written to {} but not confirmed after {attempts} attempts; refresh to see it",
                    record.label,
                    record.sheet
                );
            }
            WriteOutcome::Confirmed { id, attempts } => {
                log::info!("{} confirmed as {id} after {attempts} attempt(s)", record.label);
                self.publish_added(&record);
            }
            WriteOutcome::Written => {
                log::info!("{} written to {}", record.label, record.sheet);
                self.publish_added(&record);
            }
        }
        Ok(outcome)
    }

    async fn poll(&self, sheet: &str, confirmation: &Confirmation) -> WriteOutcome {
        let max = self.policy.max_attempts.max(1);
        for attempt in 1..=max {
            match self.cache.get(sheet, true).await {
                Ok(rows) => {
                    if let Some(id) = confirmation.find_id(&rows) {
                        return WriteOutcome::Confirmed {
                            id,
                            attempts: attempt,
                        };
                    }
                }
                Err(e) => log::warn!("confirmation poll {attempt}/{max} for {sheet} failed: {e}"),
            }
            if attempt < max {
                self.sleeper.sleep(self.policy.interval()).await;
            }
        }
        WriteOutcome::Unconfirmed { attempts: max }
    }

    fn publish_added(&self, record: &NewRecord) {
        self.bus.publish(&DashEvent::EntityAdded {
            kind: record.kind,
            sheet: record.sheet.clone(),
            label: record.label.clone(),
        });
    }
}
