//! Two-stage column → value filter cascade.
//!
//! The view first picks a column (the first descriptor is the default), then
//! one of that column's distinct values. Switching columns always resets the
//! value to [`ALL_VALUES`].

use std::collections::HashSet;

use crate::error::{DashError, Result};
use crate::types::Row;

/// Value-stage sentinel meaning "no value restriction".
pub const ALL_VALUES: &str = "__ALL_VALUES__";

type Extractor<T> = Box<dyn Fn(&T) -> String>;

/// One selectable column: key, display label, and how to read it from a record.
pub struct FilterColumn<T> {
    key: String,
    label: String,
    extractor: Extractor<T>,
}

impl<T> FilterColumn<T> {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        extractor: impl Fn(&T) -> String + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            extractor: Box::new(extractor),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn extract(&self, record: &T) -> String {
        (self.extractor)(record)
    }
}

impl FilterColumn<Row> {
    /// Column read straight from a sheet row by title.
    pub fn for_title(key: impl Into<String>, label: impl Into<String>, title: &str) -> Self {
        let title = title.to_string();
        Self::new(key, label, move |row: &Row| row.text(&title))
    }
}

pub struct DependentFilter<T> {
    columns: Vec<FilterColumn<T>>,
    active: usize,
    value: String,
}

impl<T: Clone> DependentFilter<T> {
    /// # Errors
    /// `Config` when `columns` is empty.
    pub fn new(columns: Vec<FilterColumn<T>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(DashError::Config(
                "dependent filter needs at least one column".to_string(),
            ));
        }
        Ok(Self {
            columns,
            active: 0,
            value: ALL_VALUES.to_string(),
        })
    }

    /// `(key, label)` pairs in descriptor order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|c| (c.key(), c.label()))
    }

    pub fn active_column(&self) -> &str {
        self.columns.get(self.active).map_or("", |c| c.key())
    }

    pub fn selected_value(&self) -> &str {
        &self.value
    }

    /// Make `key` the active column and reset the value stage.
    ///
    /// # Errors
    /// `UnknownColumn` when no descriptor has that key.
    pub fn select_column(&mut self, key: &str) -> Result<()> {
        self.active = self.position(key)?;
        self.value = ALL_VALUES.to_string();
        Ok(())
    }

    pub fn select_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    /// Options for the value stage: the sentinel, then distinct values of the
    /// active column in order of first appearance.
    pub fn values(&self, rows: &[T]) -> Vec<String> {
        let Some(column) = self.columns.get(self.active) else {
            return vec![ALL_VALUES.to_string()];
        };
        let mut seen = HashSet::new();
        let mut values = vec![ALL_VALUES.to_string()];
        for row in rows {
            let v = column.extract(row);
            if seen.insert(v.clone()) {
                values.push(v);
            }
        }
        values
    }

    /// Rows whose `column_key` value equals `value` exactly (case-sensitive).
    /// The sentinel returns `rows` unchanged.
    ///
    /// # Errors
    /// `UnknownColumn` when no descriptor has that key.
    pub fn apply_filter(&self, rows: &[T], column_key: &str, value: &str) -> Result<Vec<T>> {
        if value == ALL_VALUES {
            return Ok(rows.to_vec());
        }
        let column = self
            .columns
            .get(self.position(column_key)?)
            .ok_or_else(|| DashError::UnknownColumn(column_key.to_string()))?;
        Ok(rows
            .iter()
            .filter(|r| column.extract(r) == value)
            .cloned()
            .collect())
    }

    /// Apply the current column/value selection.
    pub fn apply(&self, rows: &[T]) -> Vec<T> {
        if self.value == ALL_VALUES {
            return rows.to_vec();
        }
        match self.columns.get(self.active) {
            Some(column) => rows
                .iter()
                .filter(|r| column.extract(r) == self.value)
                .cloned()
                .collect(),
            None => rows.to_vec(),
        }
    }

    fn position(&self, key: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.key() == key)
            .ok_or_else(|| DashError::UnknownColumn(key.to_string()))
    }
}
