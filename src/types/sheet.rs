use serde::{Deserialize, Serialize};

use super::Value;

/// A raw sheet exactly as the remote API returns it.
///
/// Immutable once fetched; a refresh replaces it wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSheet {
    /// Remote sheet identifier (not always present in the payload)
    #[serde(default)]
    pub id: String,
    /// Column definitions in display order
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Rows in server order
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

/// Column definition. Only the title matters for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub title: String,
}

/// One row of cells, positionally aligned with `RawSheet::columns`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    #[serde(default)]
    pub cells: Vec<RawCell>,
}

/// A cell is either a bare scalar or an object carrying `value`/`displayValue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Scalar(Value),
    Detailed {
        #[serde(default)]
        value: Option<Value>,
        #[serde(default, rename = "displayValue")]
        display_value: Option<String>,
    },
}

impl RawCell {
    /// Resolved scalar: `value` wins, `displayValue` is the fallback.
    pub fn resolve(&self) -> Value {
        match self {
            RawCell::Scalar(v) => v.clone(),
            RawCell::Detailed {
                value,
                display_value,
            } => match (value, display_value) {
                (Some(v), _) if !matches!(v, Value::Empty) => v.clone(),
                (_, Some(d)) => Value::Text(d.clone()),
                _ => Value::Empty,
            },
        }
    }
}

impl RawSheet {
    /// Build a sheet from column titles and positional cell values.
    pub fn from_values<T, R>(id: &str, titles: &[T], rows: R) -> Self
    where
        T: AsRef<str>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        Self {
            id: id.to_string(),
            columns: titles
                .iter()
                .map(|t| Column {
                    title: t.as_ref().to_string(),
                })
                .collect(),
            rows: rows
                .into_iter()
                .map(|cells| RawRow {
                    cells: cells.into_iter().map(RawCell::Scalar).collect(),
                })
                .collect(),
        }
    }

    /// Decode the JSON payload of `GET {base}/sheet/{id}`.
    pub fn from_json(id: &str, text: &str) -> crate::error::Result<Self> {
        let mut sheet: RawSheet = serde_json::from_str(text)?;
        if sheet.id.is_empty() {
            sheet.id = id.to_string();
        }
        Ok(sheet)
    }
}
