// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! An Opera store in an SQLite database file.

use std::path::Path;

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection};

use super::{ColumnValue, OperaStore, Record};
use crate::Error;

/// An [`OperaStore`] backed by an SQLite database with the Opera schema.
///
/// Inserts are collected in a transaction that is started by the first
/// insert after a commit.  Changes that were not committed when the store
/// is closed or dropped are rolled back.
pub struct SqliteStore {
    connection: Option<Connection>,
}

impl SqliteStore {
    /// Opens the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(|e| {
            Error::store_error(format!("Unable to open {}: {e}", path.display()))
        })?;
        tracing::debug!("Opened Opera database {}", path.display());
        Ok(Self::from_connection(connection))
    }

    /// Creates a store from an open connection.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Some(connection),
        }
    }

    /// Closes the database, discarding uncommitted changes.
    pub fn close(mut self) -> Result<(), Error> {
        match self.connection.take() {
            Some(connection) => {
                rollback(&connection);
                connection.close().map_err(|(_, e)| e.into())
            }
            None => Ok(()),
        }
    }

    fn connection(&self) -> Result<&Connection, Error> {
        self.connection
            .as_ref()
            .ok_or_else(|| Error::store_error("The Opera database is closed."))
    }

    fn begin(&self) -> Result<(), Error> {
        let connection = self.connection()?;
        if connection.is_autocommit() {
            connection.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}

fn quote(name: &str) -> String {
    format!("[{name}]")
}

fn rollback(connection: &Connection) {
    if !connection.is_autocommit() {
        tracing::warn!("Rolling back uncommitted changes to the Opera database.");
        if let Err(e) = connection.execute_batch("ROLLBACK") {
            tracing::error!("Rollback failed: {e}");
        }
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        if let Some(connection) = &self.connection {
            rollback(connection);
        }
    }
}

impl OperaStore for SqliteStore {
    fn select(&self, table: &str, filter: &[(&str, ColumnValue)]) -> Result<Vec<Record>, Error> {
        let mut sql = format!("SELECT * FROM {}", quote(table));
        for (i, (column, _)) in filter.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            sql.push_str(&format!(" {keyword} {} = ?{}", quote(column), i + 1));
        }

        let mut stmt = self.connection()?.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(filter.iter().map(|(_, v)| v)))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, column) in columns.iter().enumerate() {
                record.set(column, ColumnValue::from(row.get_ref(i)?));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn insert(&mut self, table: &str, record: &Record) -> Result<i64, Error> {
        let (columns, values): (Vec<_>, Vec<_>) = record.columns().unzip();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let columns = columns.into_iter().map(quote).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders})",
            quote(table)
        );

        self.begin()?;
        tracing::trace!("{sql}");
        let connection = self.connection()?;
        connection.execute(&sql, params_from_iter(values))?;
        Ok(connection.last_insert_rowid())
    }

    fn commit(&mut self) -> Result<(), Error> {
        let connection = self.connection()?;
        if !connection.is_autocommit() {
            connection.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            ColumnValue::Null => ToSqlOutput::Owned(Value::Null),
            ColumnValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            ColumnValue::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            ColumnValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            ColumnValue::Bool(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
        })
    }
}

impl From<ValueRef<'_>> for ColumnValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => ColumnValue::Null,
            ValueRef::Integer(v) => ColumnValue::Integer(v),
            ValueRef::Real(v) => ColumnValue::Real(v),
            ValueRef::Text(v) | ValueRef::Blob(v) => {
                ColumnValue::Text(String::from_utf8_lossy(v).into_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::table;
    use crate::test_utils::opera_database;

    #[test]
    fn test_insert_select() -> Result<(), Error> {
        let (_dir, path) = opera_database()?;
        let mut store = SqliteStore::open(&path)?;

        let nr = store.insert(
            table::OPTIONS,
            &Record::new()
                .with("Naam optie", "Battery1")
                .with("Cap2Act", 1.0)
                .with("Optie onbeperkt", true),
        )?;
        store.insert(
            table::COSTS,
            &Record::new()
                .with("Nr", nr)
                .with("Jaar", 2030)
                .with("Investeringskosten", ColumnValue::Null),
        )?;
        store.commit()?;

        let options = store.select(table::OPTIONS, &[("Naam optie", "Battery1".into())])?;
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].get("Nr"), Some(&ColumnValue::Integer(nr)));
        assert_eq!(options[0].get("Optie onbeperkt").and_then(|v| v.as_bool()), Some(true));

        let costs = store.select(table::COSTS, &[("Nr", nr.into()), ("Jaar", 2030.into())])?;
        assert_eq!(costs.len(), 1);
        assert!(costs[0]
            .get("Investeringskosten")
            .is_some_and(|v| v.is_null()));

        Ok(())
    }

    #[test]
    fn test_uncommitted_changes_are_discarded() -> Result<(), Error> {
        let (_dir, path) = opera_database()?;

        let mut store = SqliteStore::open(&path)?;
        store.insert(table::ACTIVITIES, &Record::new().with("Activiteit", "A"))?;
        store.commit()?;
        store.insert(table::ACTIVITIES, &Record::new().with("Activiteit", "B"))?;
        store.close()?;

        let mut store = SqliteStore::open(&path)?;
        assert!(store.exists(table::ACTIVITIES, &[("Activiteit", "A".into())])?);
        assert!(!store.exists(table::ACTIVITIES, &[("Activiteit", "B".into())])?);

        store.insert(table::ACTIVITIES, &Record::new().with("Activiteit", "C"))?;
        drop(store);

        let store = SqliteStore::open(&path)?;
        assert!(!store.exists(table::ACTIVITIES, &[("Activiteit", "C".into())])?);

        Ok(())
    }
}
