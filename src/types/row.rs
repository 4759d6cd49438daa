use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::Value;

/// One sheet record, addressed by column title.
///
/// Field order follows the sheet's column order so rows can be displayed
/// as-is; lookups ignore position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `title` to `value`, replacing an existing field of the same title in place.
    pub fn insert(&mut self, title: impl Into<String>, value: impl Into<Value>) {
        let title = title.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(t, _)| *t == title) {
            slot.1 = value;
        } else {
            self.fields.push((title, value));
        }
    }

    /// Builder-style `insert`.
    #[must_use]
    pub fn with(mut self, title: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(title, value);
        self
    }

    pub fn get(&self, title: &str) -> Option<&Value> {
        self.fields.iter().find(|(t, _)| t == title).map(|(_, v)| v)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.fields.iter().any(|(t, _)| t == title)
    }

    /// Text of a field, empty when the column is missing.
    pub fn text(&self, title: &str) -> String {
        self.get(title)
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(t, v)| (t.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every field is blank (or there are no fields).
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_blank())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (title, value) in &self.fields {
            map.serialize_entry(title, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column title to scalar")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((title, value)) = access.next_entry::<String, Value>()? {
                    row.insert(title, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut row = Row::new().with("A", 1.0).with("B", "x");
        row.insert("A", 2.0);
        assert_eq!(row.titles().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(row.get("A"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_serde_preserves_column_order() {
        let row = Row::new().with("Zeta", 1.0).with("Alpha", "a");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Zeta":1.0,"Alpha":"a"}"#);
        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_blank_row() {
        assert!(Row::new().is_blank());
        assert!(Row::new().with("A", "  ").with("B", Value::Empty).is_blank());
        assert!(!Row::new().with("A", 0.0).is_blank());
    }
}
