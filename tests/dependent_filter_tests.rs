//! Tests for the dependent column → value filter
//!
//! The value options depend on the chosen column, and choosing a different
//! column always resets the value stage to the `__ALL_VALUES__` sentinel.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use sheetdash::dependent_filter::{DependentFilter, FilterColumn, ALL_VALUES};
use sheetdash::pipeline::{self, ViewQuery};
use sheetdash::{DashError, Row, Scope};

fn activity_rows() -> Vec<Row> {
    vec![
        Row::new().with("Squad", "Alpha").with("Status", "Open").with("Owner", "Jane Doe"),
        Row::new().with("Squad", "Beta").with("Status", "Closed").with("Owner", "John Smith"),
        Row::new().with("Squad", "Alpha").with("Status", "Closed").with("Owner", "Jane Doe"),
        Row::new().with("Squad", "").with("Status", "Open").with("Owner", "Ann Lee"),
    ]
}

fn filter() -> DependentFilter<Row> {
    DependentFilter::new(vec![
        FilterColumn::for_title("squad", "Squad", "Squad"),
        FilterColumn::for_title("status", "Status", "Status"),
    ])
    .unwrap()
}

#[test]
fn test_first_column_is_default() {
    let filter = filter();
    assert_eq!(filter.active_column(), "squad");
    assert_eq!(filter.selected_value(), ALL_VALUES);
    let columns: Vec<_> = filter.columns().collect();
    assert_eq!(columns, vec![("squad", "Squad"), ("status", "Status")]);
}

#[test]
fn test_values_follow_active_column() {
    let mut filter = filter();
    assert_eq!(filter.values(&activity_rows()), vec![ALL_VALUES, "Alpha", "Beta", ""]);

    filter.select_column("status").unwrap();
    assert_eq!(filter.values(&activity_rows()), vec![ALL_VALUES, "Open", "Closed"]);
}

#[test]
fn test_switching_column_resets_value() {
    let mut filter = filter();
    filter.select_value("Alpha");
    assert_eq!(filter.apply(&activity_rows()).len(), 2);

    filter.select_column("status").unwrap();
    assert_eq!(filter.selected_value(), ALL_VALUES);
    assert_eq!(filter.apply(&activity_rows()), activity_rows());
}

#[test]
fn test_reselecting_same_column_also_resets() {
    let mut filter = filter();
    filter.select_value("Beta");
    filter.select_column("squad").unwrap();
    assert_eq!(filter.selected_value(), ALL_VALUES);
}

#[test]
fn test_sentinel_returns_input_unchanged() {
    let filter = filter();
    let rows = activity_rows();
    assert_eq!(filter.apply_filter(&rows, "status", ALL_VALUES).unwrap(), rows);
}

#[test]
fn test_apply_filter_is_exact_match() {
    let filter = filter();
    let rows = activity_rows();

    let closed = filter.apply_filter(&rows, "status", "Closed").unwrap();
    assert_eq!(closed.len(), 2);
    assert!(filter.apply_filter(&rows, "status", "closed").unwrap().is_empty());
}

#[test]
fn test_unknown_column_is_rejected() {
    let mut filter = filter();
    assert!(matches!(
        filter.select_column("owner"),
        Err(DashError::UnknownColumn(_))
    ));
    assert_eq!(filter.active_column(), "squad");
    assert!(matches!(
        filter.apply_filter(&activity_rows(), "owner", "Jane Doe"),
        Err(DashError::UnknownColumn(_))
    ));
}

#[test]
fn test_empty_descriptor_list_is_a_config_error() {
    assert!(matches!(
        DependentFilter::<Row>::new(Vec::new()),
        Err(DashError::Config(_))
    ));
}

#[derive(Debug, Clone, PartialEq)]
struct Payout {
    squad: String,
    tokens: u32,
}

#[test]
fn test_typed_records_with_custom_extractors() {
    let payouts = vec![
        Payout { squad: "Alpha".to_string(), tokens: 10 },
        Payout { squad: "Beta".to_string(), tokens: 10 },
        Payout { squad: "Alpha".to_string(), tokens: 25 },
    ];
    let mut filter = DependentFilter::new(vec![
        FilterColumn::new("squad", "Squad", |p: &Payout| p.squad.clone()),
        FilterColumn::new("tokens", "Tokens", |p: &Payout| p.tokens.to_string()),
    ])
    .unwrap();

    filter.select_column("tokens").unwrap();
    assert_eq!(filter.values(&payouts), vec![ALL_VALUES, "10", "25"]);
    filter.select_value("10");
    assert_eq!(filter.apply(&payouts).len(), 2);
}

#[test]
fn test_pipeline_applies_scope_then_filter() {
    let mut filter = filter();
    filter.select_column("status").unwrap();
    filter.select_value("Closed");

    let scope = Scope::Employee("Jane Doe".to_string());
    let rows = pipeline::run(
        &activity_rows(),
        &scope,
        &["Owner"],
        Some(&filter),
        &ViewQuery::default(),
    );
    assert_eq!(rows, vec![activity_rows()[2].clone()]);
}
