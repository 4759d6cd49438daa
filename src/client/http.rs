//! `fetch`-backed sheet client (wasm32 only; native builds report a network error).

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;

use super::{AddRowsBody, SheetSource, WriteAck};
use crate::error::{DashError, Result};
use crate::types::{RawSheet, Row};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;
#[cfg(target_arch = "wasm32")]
use web_sys::{Request, RequestInit, RequestMode, Response};

/// `{base}/sheet/{id}`
pub fn sheet_url(base: &str, sheet_id: &str) -> String {
    format!("{}/sheet/{}", base.trim_end_matches('/'), sheet_id)
}

/// `{base}/sheet/{id}/rows`
pub fn rows_url(base: &str, sheet_id: &str) -> String {
    format!("{}/rows", sheet_url(base, sheet_id))
}

/// Sheet API client over the browser `fetch` API.
#[derive(Debug, Clone)]
pub struct HttpSheetClient {
    base_url: String,
}

impl HttpSheetClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_sheet(&self, sheet_id: &str) -> Result<RawSheet> {
        let url = sheet_url(&self.base_url, sheet_id);
        log::debug!("GET {url}");
        let text = self.send("GET", &url, None).await?;
        RawSheet::from_json(sheet_id, &text)
    }

    async fn post_rows(&self, sheet_id: &str, rows: &[Row], to_top: bool) -> Result<WriteAck> {
        let url = rows_url(&self.base_url, sheet_id);
        let body = serde_json::to_string(&AddRowsBody { to_top, rows })?;
        log::debug!("POST {url} ({} rows)", rows.len());
        let text = self.send("POST", &url, Some(body)).await?;
        if text.trim().is_empty() {
            return Ok(WriteAck {
                ok: true,
                ids: Vec::new(),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    #[cfg(target_arch = "wasm32")]
    async fn send(&self, method: &str, url: &str, body: Option<String>) -> Result<String> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        let has_body = body.is_some();
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_network)?;
        if has_body {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_network)?;
        }

        let window =
            web_sys::window().ok_or_else(|| DashError::Network("no window object".to_string()))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_network)?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| DashError::Decode("fetch did not resolve to a Response".to_string()))?;

        check_status(method, url, response.status())?;

        let text = JsFuture::from(response.text().map_err(js_network)?)
            .await
            .map_err(js_network)?;
        text.as_string()
            .ok_or_else(|| DashError::Decode("response body is not text".to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn send(&self, method: &str, url: &str, _body: Option<String>) -> Result<String> {
        Err(DashError::Network(format!(
            "{method} {url}: fetch transport is only available in the browser"
        )))
    }
}

impl SheetSource for HttpSheetClient {
    fn fetch_sheet<'a>(&'a self, sheet_id: &'a str) -> LocalBoxFuture<'a, Result<RawSheet>> {
        self.get_sheet(sheet_id).boxed_local()
    }

    fn add_rows<'a>(
        &'a self,
        sheet_id: &'a str,
        rows: &'a [Row],
        to_top: bool,
    ) -> LocalBoxFuture<'a, Result<WriteAck>> {
        self.post_rows(sheet_id, rows, to_top).boxed_local()
    }
}

/// Any status outside 200-299 is a network failure, 404 included.
fn check_status(method: &str, url: &str, status: u16) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    Err(DashError::Network(format!("{method} {url} returned status {status}")))
}

#[cfg(target_arch = "wasm32")]
fn js_network(e: JsValue) -> DashError {
    DashError::Network(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        assert_eq!(
            sheet_url("https://api.example.com/", "123"),
            "https://api.example.com/sheet/123"
        );
        assert_eq!(
            rows_url("https://api.example.com", "123"),
            "https://api.example.com/sheet/123/rows"
        );
    }

    #[test]
    fn test_non_success_status_is_network_error() {
        assert!(check_status("GET", "u", 200).is_ok());
        assert!(check_status("POST", "u", 204).is_ok());
        for status in [301, 404, 500, 503] {
            assert!(matches!(
                check_status("GET", "u", status),
                Err(DashError::Network(_))
            ));
        }
    }

    #[test]
    fn test_add_rows_body_shape() {
        let rows = vec![Row::new().with("Squad Name", "Blue")];
        let json = serde_json::to_string(&AddRowsBody {
            to_top: true,
            rows: &rows,
        })
        .unwrap_or_default();
        assert_eq!(json, r#"{"toTop":true,"rows":[{"Squad Name":"Blue"}]}"#);
    }
}
