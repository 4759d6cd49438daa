//! The row pipeline every view runs before painting:
//! admin scope → dependent filter → text search → sort.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::admin_filter::apply_scope;
use crate::dependent_filter::DependentFilter;
use crate::types::{Row, Scope, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

/// Search and sort settings of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    /// Case-insensitive substring; blank disables search
    #[serde(default)]
    pub search: String,
    /// Columns searched; empty means every column
    #[serde(default)]
    pub search_columns: Vec<String>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

/// Rows containing `needle` (case-insensitive) in any of `columns`.
pub fn search(rows: &[Row], needle: &str, columns: &[String]) -> Vec<Row> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| {
            row.iter()
                .filter(|(title, _)| {
                    columns.is_empty() || columns.iter().any(|c| c.as_str() == *title)
                })
                .any(|(_, v)| v.as_text().to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Stable sort by one column. Numbers come before text and compare
/// numerically, text compares case-insensitively; blank values always sort
/// last.
pub fn sort_rows(rows: &mut [Row], spec: &SortSpec) {
    rows.sort_by(|a, b| {
        let (va, vb) = (a.get(&spec.column), b.get(&spec.column));
        let blank_a = va.map_or(true, Value::is_blank);
        let blank_b = vb.map_or(true, Value::is_blank);
        match (blank_a, blank_b) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = compare_values(va, vb);
                if spec.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
        }
    });
}

/// Sort key of a non-blank cell. Numbers and text form separate classes so
/// mixed columns still get a total order.
#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn of(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_number) {
            Some(n) => Self::Number(n),
            None => Self::Text(value.map(|v| v.as_text().to_lowercase()).unwrap_or_default()),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (SortKey::of(a), SortKey::of(b)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(&y),
    }
}

/// Run the whole pipeline. Input rows are never modified.
pub fn run(
    rows: &[Row],
    scope: &Scope,
    scope_columns: &[&str],
    filter: Option<&DependentFilter<Row>>,
    query: &ViewQuery,
) -> Vec<Row> {
    let scoped = apply_scope(scope, rows, scope_columns);
    let filtered = match filter {
        Some(f) => f.apply(&scoped),
        None => scoped,
    };
    let mut found = search(&filtered, &query.search, &query.search_columns);
    if let Some(spec) = &query.sort {
        sort_rows(&mut found, spec);
    }
    found
}
