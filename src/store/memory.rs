// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! An in-memory Opera store.

use std::collections::HashMap;

use super::{table, ColumnValue, OperaStore, Record};
use crate::Error;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Record>,
    autonumber: Option<String>,
    last_id: i64,
}

/// An [`OperaStore`] that keeps all tables in memory.
///
/// Tables are created on their first insert.  Options get their `Nr`
/// assigned by the store, like in an Opera database.
#[derive(Debug)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut store = Self {
            tables: HashMap::new(),
        };
        store.set_autonumber(table::OPTIONS, "Nr");
        store
    }

    /// Makes the store assign increasing numbers to `column` of rows inserted
    /// into `table` without one.
    pub fn set_autonumber(&mut self, table: &str, column: &str) {
        self.tables.entry(table.to_string()).or_default().autonumber = Some(column.to_string());
    }

    /// Returns all rows of a table, in insertion order.
    pub fn rows(&self, table: &str) -> &[Record] {
        self.tables
            .get(table)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
    }
}

impl OperaStore for MemoryStore {
    fn select(&self, table: &str, filter: &[(&str, ColumnValue)]) -> Result<Vec<Record>, Error> {
        Ok(self
            .rows(table)
            .iter()
            .filter(|row| row.matches(filter))
            .cloned()
            .collect())
    }

    fn insert(&mut self, table: &str, record: &Record) -> Result<i64, Error> {
        let table = self.tables.entry(table.to_string()).or_default();
        let mut record = record.clone();

        let id = match &table.autonumber {
            Some(column) => match record.get(column).filter(|v| !v.is_null()) {
                Some(value) => value.as_i64().ok_or_else(|| {
                    Error::store_error(format!("Invalid value {value} for column {column}."))
                })?,
                None => {
                    let id = table.last_id + 1;
                    record.set(column, id);
                    id
                }
            },
            None => table.rows.len() as i64 + 1,
        };
        table.last_id = table.last_id.max(id);
        table.rows.push(record);

        Ok(id)
    }

    fn commit(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autonumber() -> Result<(), Error> {
        let mut store = MemoryStore::new();
        let first = store.insert(table::OPTIONS, &Record::new().with("Naam optie", "A"))?;
        let second = store.insert(
            table::OPTIONS,
            &Record::new().with("Nr", 10).with("Naam optie", "B"),
        )?;
        let third = store.insert(table::OPTIONS, &Record::new().with("Naam optie", "C"))?;
        assert_eq!((first, second, third), (1, 10, 11));

        let rows = store.select(table::OPTIONS, &[("Naam optie", "C".into())])?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Nr"), Some(&ColumnValue::Integer(11)));

        Ok(())
    }

    #[test]
    fn test_select() -> Result<(), Error> {
        let mut store = MemoryStore::new();
        assert!(store.select(table::COSTS, &[])?.is_empty());

        store.insert(table::COSTS, &Record::new().with("Nr", 1).with("Jaar", 2030))?;
        store.insert(table::COSTS, &Record::new().with("Nr", 1).with("Jaar", 2040))?;
        store.insert(table::COSTS, &Record::new().with("Nr", 2).with("Jaar", 2030))?;

        assert_eq!(store.select(table::COSTS, &[("Nr", 1.into())])?.len(), 2);
        assert_eq!(
            store
                .select(table::COSTS, &[("Jaar", 2030.into()), ("Nr", 2.into())])?
                .len(),
            1
        );
        assert!(store.exists(table::COSTS, &[("Jaar", "2040".into())])?);
        assert!(!store.exists(table::COSTS, &[("Jaar", 2050.into())])?);
        assert_eq!(store.rows(table::COSTS).len(), 3);

        Ok(())
    }
}
