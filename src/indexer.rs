//! Raw sheet → titled rows, plus ordered-alias column lookup.
//!
//! Sheets share no fixed schema. The same logical field can be titled
//! "Employee ID" on one sheet and "Position ID" on another, so consumers
//! probe an ordered list of aliases instead of a single column name.

use crate::types::{RawSheet, Row, Value};

/// Index a raw sheet into rows keyed by column title.
///
/// Cells are matched to columns by position. Cells past the last column are
/// ignored and missing trailing cells become `Empty`. A row without cells
/// still produces a (blank) row; it is never dropped.
pub fn index(sheet: &RawSheet) -> Vec<Row> {
    sheet
        .rows
        .iter()
        .map(|raw| {
            if raw.cells.is_empty() {
                return Row::new();
            }
            let mut cells = raw.cells.iter();
            sheet
                .columns
                .iter()
                .map(|col| {
                    let value = cells.next().map(|c| c.resolve()).unwrap_or(Value::Empty);
                    (col.title.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// First alias column that exists on `row`, with its value.
pub fn first_present<'r>(row: &'r Row, aliases: &[&str]) -> Option<(&'r str, &'r Value)> {
    aliases
        .iter()
        .find_map(|alias| row.iter().find(|(title, _)| title == alias))
}

/// Like [`first_present`] but skips columns whose value is blank.
pub fn first_non_empty<'r>(row: &'r Row, aliases: &[&str]) -> Option<&'r Value> {
    aliases
        .iter()
        .filter_map(|alias| row.get(alias))
        .find(|v| !v.is_blank())
}

/// First alias present on any row of the set.
///
/// Blank rows carry no columns, so no single row speaks for the schema.
pub fn resolve_column<'a>(rows: &[Row], aliases: &[&'a str]) -> Option<&'a str> {
    aliases
        .iter()
        .copied()
        .find(|alias| rows.iter().any(|row| row.contains(alias)))
}

/// Case-insensitive, whitespace-trimmed key used for id and level joins.
pub fn normalize_key(value: &Value) -> String {
    value.as_text().trim().to_lowercase()
}
