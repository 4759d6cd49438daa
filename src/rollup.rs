//! Grouped sums, counts and percentages over row sequences.
//!
//! Aggregation never fails on data: a missing or non-numeric field counts as
//! 0 (see [`to_number`]), so `NaN` never reaches a total. Groups are kept in
//! ordered maps and every sum adds its terms in ascending order, so results
//! do not depend on input row order.

use std::collections::BTreeMap;

use crate::columns;
use crate::indexer::{first_non_empty, first_present};
use crate::types::{Classification, RollupResult, Row, Value};

/// Numeric coercion used by every rollup: missing or non-numeric is 0.
pub fn to_number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_number).unwrap_or(0.0)
}

/// Numeric value of the first alias column present on `row`.
pub fn number_of(row: &Row, aliases: &[&str]) -> f64 {
    to_number(first_present(row, aliases).map(|(_, v)| v))
}

/// Trimmed text of the first non-blank alias column, empty if none.
pub fn text_of(row: &Row, aliases: &[&str]) -> String {
    first_non_empty(row, aliases)
        .map(|v| v.as_text().trim().to_string())
        .unwrap_or_default()
}

/// Sum `value_of` over the rows accepted by `predicate`.
pub fn sum<T>(rows: &[T], predicate: impl Fn(&T) -> bool, value_of: impl Fn(&T) -> f64) -> f64 {
    total(
        rows.iter()
            .filter(|r| predicate(r))
            .map(|r| finite_or_zero(value_of(r)))
            .collect(),
    )
}

/// Per-group sums of `value_of` over the rows accepted by `predicate`.
pub fn group_sum<T>(
    rows: &[T],
    predicate: impl Fn(&T) -> bool,
    key_of: impl Fn(&T) -> String,
    value_of: impl Fn(&T) -> f64,
) -> BTreeMap<String, f64> {
    let mut parts: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in rows.iter().filter(|r| predicate(r)) {
        parts
            .entry(key_of(row))
            .or_default()
            .push(finite_or_zero(value_of(row)));
    }
    parts
        .into_iter()
        .map(|(key, values)| (key, total(values)))
        .collect()
}

pub fn count<T>(rows: &[T], predicate: impl Fn(&T) -> bool) -> usize {
    rows.iter().filter(|r| predicate(r)).count()
}

pub fn group_count<T>(
    rows: &[T],
    predicate: impl Fn(&T) -> bool,
    key_of: impl Fn(&T) -> String,
) -> BTreeMap<String, usize> {
    let mut groups = BTreeMap::new();
    for row in rows.iter().filter(|r| predicate(r)) {
        *groups.entry(key_of(row)).or_insert(0) += 1;
    }
    groups
}

/// Grouped sums together with their grand total.
pub fn rollup<T>(
    rows: &[T],
    predicate: impl Fn(&T) -> bool,
    key_of: impl Fn(&T) -> String,
    value_of: impl Fn(&T) -> f64,
) -> RollupResult {
    let groups = group_sum(rows, predicate, key_of, value_of);
    RollupResult {
        total: total(groups.values().copied().collect()),
        groups,
    }
}

/// Threshold classification, inclusive toward "met" at both bounds.
pub fn classify(value: f64, min: f64, max: f64) -> Classification {
    Classification::of(value, min, max)
}

/// `round(completed / total * 100)`, or 0 when `total` is 0.
pub fn percent_complete(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let pct = ((completed as f64 / total as f64) * 100.0).round() as u32;
    pct
}

/// Sum in ascending order so the result does not depend on input order.
fn total(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}

fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

// ============================================================================
// Dashboard rollups
// ============================================================================

fn same_key(row: &Row, aliases: &[&str], wanted: &str) -> bool {
    text_of(row, aliases).eq_ignore_ascii_case(wanted.trim())
}

/// True when the row belongs to `month` (`YYYY-MM`), judged by a month
/// column or, failing that, the prefix of a date column.
pub fn in_month(row: &Row, month: &str) -> bool {
    let month = month.trim();
    let explicit = text_of(row, columns::MONTH);
    if !explicit.is_empty() {
        return explicit == month;
    }
    text_of(row, columns::DATE).starts_with(month)
}

/// Power hours logged by one employee in one month.
pub fn monthly_hours(rows: &[Row], employee_id: &str, month: &str) -> f64 {
    sum(
        rows,
        |r| same_key(r, columns::EMPLOYEE_ID, employee_id) && in_month(r, month),
        |r| number_of(r, columns::HOURS),
    )
}

/// Hours per activity, optionally restricted to one employee.
pub fn hours_by_activity(rows: &[Row], employee_id: Option<&str>) -> RollupResult {
    rollup(
        rows,
        |r| employee_id.map_or(true, |id| same_key(r, columns::EMPLOYEE_ID, id)),
        |r| text_of(r, columns::ACTIVITY),
        |r| number_of(r, columns::HOURS),
    )
}

/// Token payouts per employee name.
pub fn tokens_by_employee(rows: &[Row]) -> RollupResult {
    rollup(
        rows,
        |r| !text_of(r, columns::EMPLOYEE_NAME).is_empty(),
        |r| text_of(r, columns::EMPLOYEE_NAME),
        |r| number_of(r, columns::TOKENS),
    )
}

/// KPI totals per squad.
pub fn kpi_by_squad(rows: &[Row]) -> RollupResult {
    rollup(
        rows,
        |r| !text_of(r, columns::SQUAD).is_empty(),
        |r| text_of(r, columns::SQUAD),
        |r| number_of(r, columns::KPI_VALUE),
    )
}

/// Share of non-blank rows whose status reads as completed.
pub fn completion_percent(rows: &[Row]) -> u32 {
    let total = count(rows, |r| !r.is_blank());
    let done = count(rows, |r| {
        let status = text_of(r, columns::STATUS).to_lowercase();
        columns::COMPLETED_STATUSES.contains(&status.as_str())
    });
    percent_complete(done, total)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_non_numeric_counts_as_zero() {
        let rows = vec![
            Row::new().with("Hours", 2.0),
            Row::new().with("Hours", "abc"),
            Row::new(),
            Row::new().with("Hours", "3"),
        ];
        assert_eq!(sum(&rows, |_| true, |r| number_of(r, &["Hours"])), 5.0);
    }

    #[test]
    fn test_sum_ignores_non_finite_values() {
        let rows = [1.0, f64::NAN, f64::INFINITY, 2.0];
        assert_eq!(sum(&rows, |_| true, |v| *v), 3.0);
    }

    #[test]
    fn test_fractional_sums_ignore_row_order() {
        let forward = vec![
            Row::new().with("Activity", "g").with("Hours", 0.1),
            Row::new().with("Activity", "g").with("Hours", 0.2),
            Row::new().with("Activity", "g").with("Hours", 0.3),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();
        let hours = |r: &Row| number_of(r, &["Hours"]);
        let activity = |r: &Row| r.text("Activity");

        assert_eq!(
            sum(&forward, |_| true, hours),
            sum(&reversed, |_| true, hours)
        );
        assert_eq!(
            group_sum(&forward, |_| true, activity, hours),
            group_sum(&reversed, |_| true, activity, hours)
        );
        assert_eq!(
            rollup(&forward, |_| true, activity, hours),
            rollup(&reversed, |_| true, activity, hours)
        );
    }

    #[test]
    fn test_percent_complete() {
        assert_eq!(percent_complete(0, 0), 0);
        assert_eq!(percent_complete(1, 3), 33);
        assert_eq!(percent_complete(2, 3), 67);
        assert_eq!(percent_complete(4, 4), 100);
    }

    #[test]
    fn test_in_month_falls_back_to_date_prefix() {
        assert!(in_month(&Row::new().with("Date", "2024-01-17"), "2024-01"));
        assert!(!in_month(&Row::new().with("Date", "2024-02-01"), "2024-01"));
        assert!(in_month(&Row::new().with("Month", " 2024-01 "), "2024-01"));
    }
}
