// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Access to the Opera options database.
//!
//! The importer talks to the database through the [`OperaStore`] trait,
//! which only knows how to select rows by column values, insert rows and
//! commit.  The typed operations on the individual Opera tables are provided
//! on top of it by the [`OperaTables`] extension trait, so every
//! implementation of `OperaStore` gets them for free.
//!
//! Two implementations are included: [`SqliteStore`] for database files and
//! [`MemoryStore`] for in-process use.

mod memory;
mod sqlite;
mod tables;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use tables::{
    table, ActivityBaselineRow, ActivityRow, CapacityRangeRow, CarrierAllocationRow,
    CarrierPriceRow, CarrierRow, CostRow, EnergyUseRow, FlowRow, OperaTables, OptionActivityRow,
    OptionRow, StorageParametersRow, TechnicalParametersRow, VariantRow,
};

use crate::Error;

/// A value in a column of a store row.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Returns the value as an integer, if it is numeric.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Integer(v) => Some(*v),
            ColumnValue::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            ColumnValue::Bool(v) => Some(i64::from(*v)),
            ColumnValue::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the value as a float, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Integer(v) => Some(*v as f64),
            ColumnValue::Real(v) => Some(*v),
            ColumnValue::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the value as a boolean.  Numbers are true when not zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            ColumnValue::Integer(v) => Some(*v != 0),
            ColumnValue::Real(v) => Some(*v != 0.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if the two values compare equal the way a database would
    /// compare them: numbers by value, and text against numbers by the
    /// number the text holds.
    pub fn matches(&self, other: &ColumnValue) -> bool {
        match (self, other) {
            (ColumnValue::Null, _) | (_, ColumnValue::Null) => false,
            (ColumnValue::Text(a), ColumnValue::Text(b)) => a == b,
            (a, b) => match (a.as_f64_or_bool(), b.as_f64_or_bool()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    fn as_f64_or_bool(&self) -> Option<f64> {
        match self {
            ColumnValue::Bool(v) => Some(f64::from(u8::from(*v))),
            other => other.as_f64(),
        }
    }
}

impl std::fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnValue::Null => write!(f, "NULL"),
            ColumnValue::Integer(v) => write!(f, "{v}"),
            ColumnValue::Real(v) => write!(f, "{v}"),
            ColumnValue::Text(v) => write!(f, "'{v}'"),
            ColumnValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

impl From<i32> for ColumnValue {
    fn from(value: i32) -> Self {
        ColumnValue::Integer(value.into())
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Real(value)
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        ColumnValue::Bool(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ColumnValue::Null, Into::into)
    }
}

/// A row of a store table: column names and values, in column order.
///
/// Column names are matched case-insensitively, as Opera's database does.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, ColumnValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record with the given column set.
    pub fn with(mut self, column: &str, value: impl Into<ColumnValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Returns the value of a column.
    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.position(column).map(|i| &self.columns[i].1)
    }

    /// Sets a column, replacing its value if it is already present.
    pub fn set(&mut self, column: &str, value: impl Into<ColumnValue>) {
        let value = value.into();
        match self.position(column) {
            Some(i) => self.columns[i].1 = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    /// Removes a column and returns its value.
    pub fn remove(&mut self, column: &str) -> Option<ColumnValue> {
        self.position(column).map(|i| self.columns.remove(i).1)
    }

    /// Returns an iterator over the columns and their values.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns true if every column of the filter has a matching value in
    /// this record.
    pub fn matches(&self, filter: &[(&str, ColumnValue)]) -> bool {
        filter
            .iter()
            .all(|(column, value)| self.get(column).is_some_and(|v| v.matches(value)))
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|(c, _)| c.eq_ignore_ascii_case(column))
    }
}

impl FromIterator<(String, ColumnValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, ColumnValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.set(&column, value);
        }
        record
    }
}

/// A relational store with the Opera schema.
///
/// The schema is never created or altered through this trait, only rows are
/// read and added.
pub trait OperaStore {
    /// Returns the rows of `table` whose columns match all values in
    /// `filter`.
    fn select(&self, table: &str, filter: &[(&str, ColumnValue)]) -> Result<Vec<Record>, Error>;

    /// Inserts a row into `table` and returns the identifier the store
    /// assigned to it.
    fn insert(&mut self, table: &str, record: &Record) -> Result<i64, Error>;

    /// Makes all inserts since the last commit permanent.
    fn commit(&mut self) -> Result<(), Error>;

    /// Returns true if `table` has a row matching `filter`.
    fn exists(&self, table: &str, filter: &[(&str, ColumnValue)]) -> Result<bool, Error> {
        Ok(!self.select(table, filter)?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut record = Record::new().with("Nr", 3).with("Naam optie", "Wind");
        assert_eq!(record.get("nr"), Some(&ColumnValue::Integer(3)));
        assert_eq!(record.get("NAAM OPTIE").and_then(|v| v.as_str()), Some("Wind"));

        record.set("nr", 4);
        assert_eq!(record.len(), 2);
        assert_eq!(record.columns().next(), Some(("Nr", &ColumnValue::Integer(4))));

        assert_eq!(record.remove("Nr"), Some(ColumnValue::Integer(4)));
        assert_eq!(record.remove("Nr"), None);
        assert_eq!(record.len(), 1);

        record.set("Prijs", None::<f64>);
        assert!(record.get("Prijs").is_some_and(|v| v.is_null()));
    }

    #[test]
    fn test_matches() {
        let record = Record::new()
            .with("Jaar", "2030")
            .with("Nr", 5)
            .with("Match", true)
            .with("Leeg", ColumnValue::Null);

        assert!(record.matches(&[("jaar", 2030.into()), ("Nr", 5.0.into())]));
        assert!(record.matches(&[("Match", 1.into())]));
        assert!(!record.matches(&[("Nr", 6.into())]));
        assert!(!record.matches(&[("Leeg", ColumnValue::Null)]));
        assert!(!record.matches(&[("Onbekend", 1.into())]));
        assert!(record.matches(&[]));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(ColumnValue::Text(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(ColumnValue::Real(2.0).as_i64(), Some(2));
        assert_eq!(ColumnValue::Real(2.5).as_i64(), None);
        assert_eq!(ColumnValue::Integer(0).as_bool(), Some(false));
        assert_eq!(ColumnValue::Null.as_f64(), None);
        assert_eq!(ColumnValue::Text("Wind".into()).to_string(), "'Wind'");
    }
}
