//! JavaScript facade over [`Dashboard`].
//!
//! Async operations return `Promise`s; row sets and events cross the boundary
//! as plain JS objects via `serde-wasm-bindgen`.

use std::rc::Rc;

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::bus::SubscriptionId;
use crate::client::{HttpSheetClient, SystemSleeper};
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::pipeline::ViewQuery;
use crate::rollup;
use crate::session::{BrowserSessionStore, Identity};
use crate::types::{EntityKind, Row};
use crate::writer::{ConfirmRequest, NewRecord, WriteOutcome};

/// What `addRows` resolves to.
#[derive(serde::Serialize)]
struct AddRowsResult {
    status: &'static str,
    id: Option<String>,
    attempts: Option<u32>,
}

impl From<WriteOutcome> for AddRowsResult {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Written => Self {
                status: "written",
                id: None,
                attempts: None,
            },
            WriteOutcome::Confirmed { id, attempts } => Self {
                status: "confirmed",
                id: Some(id),
                attempts: Some(attempts),
            },
            WriteOutcome::Unconfirmed { attempts } => Self {
                status: "unconfirmed",
                id: None,
                attempts: Some(attempts),
            },
        }
    }
}

/// Maps (rows, rollup groups) become plain objects so `row["Employee Name"]` works.
fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Deserialization error: {e}")))
}

#[wasm_bindgen]
pub struct WasmDashboard {
    inner: Rc<Dashboard>,
}

#[wasm_bindgen]
impl WasmDashboard {
    /// Build the dashboard core from a JSON config string.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmDashboard, JsValue> {
        console_error_panic_hook::set_once();
        crate::logging::init(log::LevelFilter::Info);

        let config = DashboardConfig::from_json(config_json)?;
        let source = Rc::new(HttpSheetClient::new(config.base_url.clone()));
        let inner = Dashboard::new(
            config,
            source,
            Box::new(BrowserSessionStore),
            Rc::new(SystemSleeper),
        )?;
        Ok(WasmDashboard {
            inner: Rc::new(inner),
        })
    }

    /// Resolves to the sheet's rows as an array of objects.
    pub fn rows(&self, key: String, force: bool) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let rows = inner.rows(&key, force).await?;
            to_js(&*rows)
        })
    }

    /// Resolves to the rows after admin scope, search and sort.
    pub fn view_rows(&self, key: String, query: JsValue) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let query: ViewQuery = if query.is_undefined() || query.is_null() {
                ViewQuery::default()
            } else {
                from_js(query)?
            };
            let rows = inner.view_rows(&key, None, &query).await?;
            to_js(&rows)
        })
    }

    /// Resolves to `{ level, min, max }`.
    pub fn goal_band(&self, employee_id: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move { to_js(&inner.goal_band(&employee_id).await) })
    }

    /// Resolves to `{ total, groups }` of hours per activity.
    pub fn hours_by_activity(&self, key: String, employee_id: Option<String>) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let rows = inner.scoped_rows(&key, false).await?;
            to_js(&rollup::hours_by_activity(&rows, employee_id.as_deref()))
        })
    }

    /// Resolves to `{ status, id, attempts }` with status `"written"`,
    /// `"confirmed"` or `"unconfirmed"`.
    ///
    /// `confirm` is optional: `{ matchColumn, matchValue, idColumns? }` polls
    /// the sheet until the matching row shows an id.
    pub fn add_rows(
        &self,
        key: String,
        label: String,
        rows: JsValue,
        to_top: bool,
        confirm: JsValue,
    ) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let rows: Vec<Row> = from_js(rows)?;
            let mut record = NewRecord::new(&key, EntityKind::Other, &label, rows);
            record.to_top = to_top;
            if !confirm.is_undefined() && !confirm.is_null() {
                let request: ConfirmRequest = from_js(confirm)?;
                record = record.confirm_with(request.into_confirmation());
            }
            let outcome = inner.add_rows(record).await?;
            to_js(&AddRowsResult::from(outcome))
        })
    }

    pub fn login(&self, employee_id: String, display_name: String) -> Result<(), JsValue> {
        Ok(self.inner.login(&Identity {
            employee_id,
            display_name,
        })?)
    }

    pub fn logout(&self) -> Result<(), JsValue> {
        Ok(self.inner.logout()?)
    }

    pub fn set_scope(&self, value: &str) -> Result<String, JsValue> {
        Ok(self.inner.set_scope(value)?.as_stored().to_string())
    }

    pub fn scope(&self) -> String {
        self.inner.scope().as_stored().to_string()
    }

    pub fn clear_cache(&self, key_or_id: &str) -> usize {
        self.inner.clear_cache(key_or_id)
    }

    /// Register `callback(event)`; returns an id for [`WasmDashboard::unsubscribe`].
    pub fn subscribe(&self, callback: Function) -> f64 {
        let id = self.inner.subscribe(move |event| {
            if let Ok(value) = to_js(event) {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    log::warn!("event listener threw: {e:?}");
                }
            }
        });
        #[allow(clippy::cast_precision_loss)]
        let id = id.as_u64() as f64;
        id
    }

    pub fn unsubscribe(&self, id: f64) -> bool {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let id = SubscriptionId::from_u64(id as u64);
        self.inner.unsubscribe(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::RollupResult;
    use wasm_bindgen_test::*;

    fn get(target: &JsValue, key: &str) -> JsValue {
        js_sys::Reflect::get(target, &JsValue::from_str(key)).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_rows_cross_as_plain_objects() {
        let rows = vec![Row::new().with("Employee Name", "Jane Doe").with("Hours", 2.0)];
        let value = to_js(&rows).unwrap();
        let first = js_sys::Array::from(&value).get(0);

        assert!(!first.is_instance_of::<js_sys::Map>());
        assert_eq!(get(&first, "Employee Name").as_string().as_deref(), Some("Jane Doe"));
    }

    #[wasm_bindgen_test]
    fn test_rollup_groups_cross_as_plain_objects() {
        let rows = vec![Row::new().with("Activity", "Support").with("Hours", 1.5)];
        let result: RollupResult = rollup::hours_by_activity(&rows, None);
        let groups = get(&to_js(&result).unwrap(), "groups");

        assert!(!groups.is_instance_of::<js_sys::Map>());
        assert_eq!(get(&groups, "Support").as_f64(), Some(1.5));
    }
}
