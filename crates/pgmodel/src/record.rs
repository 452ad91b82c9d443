//! Fetched rows as ordered, string-keyed mappings.

use std::ops::Index;

use tokio_postgres::Row;

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// A decoded row: column names mapped to [`Value`]s, in result order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every column of a driver row.
    pub fn from_row(row: &Row) -> OrmResult<Self> {
        let columns = row
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                row.try_get::<_, Value>(idx)
                    .map(|v| (col.name().to_string(), v))
                    .map_err(|e| OrmError::decode(col.name(), e.to_string()))
            })
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Append a column (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Like [`Record::get`], but a missing column is an error.
    pub fn try_get(&self, name: &str) -> OrmResult<&Value> {
        self.get(name)
            .ok_or_else(|| OrmError::decode(name, "column not present in record"))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Index<&str> for Record {
    type Output = Value;

    /// Missing columns read as NULL.
    fn index(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.get(name).unwrap_or(&NULL)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let rec = Record::new().with("_id", 1).with("name", "a");
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get("name"), Some(&Value::from("a")));
        assert_eq!(rec["missing"], Value::Null);
        assert!(matches!(rec.try_get("missing"), Err(OrmError::Decode { .. })));
        assert_eq!(rec.columns().collect::<Vec<_>>(), vec!["_id", "name"]);
    }
}
