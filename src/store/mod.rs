//! SQLite-backed table store for cleaned disaster events.
//!
//! The loader writes one table with a destructive replace; the dashboard does
//! a single full-table read at startup. No server-side filtering happens here.

use polars::prelude::*;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub struct EventStore {
    conn: Connection,
    table: String,
}

impl EventStore {
    pub fn open(path: &Path, table: &str) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open(path)?,
            table: table.to_string(),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory(table: &str) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            table: table.to_string(),
        })
    }

    /// Destructively replace the events table with the given frame. No
    /// migration, no versioning: DROP, CREATE, bulk insert in one transaction.
    pub fn replace_events(&mut self, df: &DataFrame) -> Result<usize, StoreError> {
        let columns = df.get_columns();

        let declarations: Vec<String> = columns
            .iter()
            .map(|column| {
                let sql_type = match column.dtype() {
                    DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
                    | DataType::Boolean => "INTEGER",
                    DataType::Float32 | DataType::Float64 => "REAL",
                    _ => "TEXT",
                };
                format!("\"{}\" {}", column.name(), sql_type)
            })
            .collect();

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let insert_sql = format!(
            "INSERT INTO \"{}\" VALUES ({})",
            self.table,
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{}\"; CREATE TABLE \"{}\" ({});",
            self.table,
            self.table,
            declarations.join(", ")
        ))?;

        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in 0..df.height() {
                let mut values: Vec<Value> = Vec::with_capacity(columns.len());
                for column in columns {
                    values.push(sql_value(column, row)?);
                }
                stmt.execute(rusqlite::params_from_iter(values))?;
            }
        }
        tx.commit()?;

        Ok(df.height())
    }

    /// Full-table read. All predicate evaluation happens in memory afterwards.
    pub fn load_events(&self) -> Result<DataFrame, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM \"{}\"", self.table))?;
        let names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut buffers: Vec<Vec<Value>> = names.iter().map(|_| Vec::new()).collect();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (index, buffer) in buffers.iter_mut().enumerate() {
                buffer.push(row.get::<_, Value>(index)?);
            }
        }

        let columns: Vec<Column> = names
            .iter()
            .zip(buffers)
            .map(|(name, values)| column_from_values(name, values))
            .collect();

        Ok(DataFrame::new(columns)?)
    }
}

/// One cell of a frame as a SQLite value, preserving nulls.
fn sql_value(column: &Column, row: usize) -> Result<Value, StoreError> {
    let value = match column.dtype() {
        DataType::Int64 => column
            .i64()?
            .get(row)
            .map(Value::Integer)
            .unwrap_or(Value::Null),
        DataType::Int32 => column
            .i32()?
            .get(row)
            .map(|v| Value::Integer(v as i64))
            .unwrap_or(Value::Null),
        DataType::Float64 => column
            .f64()?
            .get(row)
            .map(Value::Real)
            .unwrap_or(Value::Null),
        DataType::String => column
            .str()?
            .get(row)
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        DataType::Boolean => column
            .bool()?
            .get(row)
            .map(|v| Value::Integer(v as i64))
            .unwrap_or(Value::Null),
        _ => {
            let any = column.get(row)?;
            if any.is_null() {
                Value::Null
            } else {
                Value::Text(any.to_string().trim_matches('"').to_string())
            }
        }
    };
    Ok(value)
}

/// Rebuild a typed column from SQLite's dynamically typed values: all-integer
/// columns come back as Int64, numeric mixes as Float64, everything else as
/// text. Nulls survive in every case.
fn column_from_values(name: &str, values: Vec<Value>) -> Column {
    let all_integer = values
        .iter()
        .all(|v| matches!(v, Value::Integer(_) | Value::Null));
    if all_integer {
        let data: Vec<Option<i64>> = values
            .iter()
            .map(|v| match v {
                Value::Integer(i) => Some(*i),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), data);
    }

    let all_numeric = values
        .iter()
        .all(|v| matches!(v, Value::Integer(_) | Value::Real(_) | Value::Null));
    if all_numeric {
        let data: Vec<Option<f64>> = values
            .iter()
            .map(|v| match v {
                Value::Integer(i) => Some(*i as f64),
                Value::Real(f) => Some(*f),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), data);
    }

    let data: Vec<Option<String>> = values
        .into_iter()
        .map(|v| match v {
            Value::Text(s) => Some(s),
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Blob(_) | Value::Null => None,
        })
        .collect();
    Column::new(name.into(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn cleaned_frame() -> DataFrame {
        df!(
            schema::DISASTER_TYPE => ["Flood", "Storm", "Others"],
            schema::COUNTRY => ["India", "USA", "Japan"],
            schema::START_DATE => [Some("2011-03-05"), None, Some("2015-06-30")],
            schema::END_DATE => [Some("2011-03-09"), Some("2012-07-15"), None],
            schema::YEAR => [Some(2011i64), Some(2012), None],
            schema::FATALITIES => [10i64, 0, 7],
            schema::AFFECTED => [100i64, 250, 5],
        )
        .unwrap()
    }

    #[test]
    fn round_trip_preserves_rows_and_nulls() {
        let mut store = EventStore::open_in_memory(schema::DEFAULT_TABLE).unwrap();
        let df = cleaned_frame();
        let written = store.replace_events(&df).unwrap();
        assert_eq!(written, 3);

        let loaded = store.load_events().unwrap();
        assert_eq!(loaded, df);
    }

    #[test]
    fn replace_overwrites_the_previous_table() {
        let mut store = EventStore::open_in_memory(schema::DEFAULT_TABLE).unwrap();
        store.replace_events(&cleaned_frame()).unwrap();

        let smaller = df!(
            schema::DISASTER_TYPE => ["Flood"],
            schema::COUNTRY => ["India"],
            schema::START_DATE => [Some("2011-03-05")],
            schema::END_DATE => [Some("2011-03-09")],
            schema::YEAR => [Some(2011i64)],
            schema::FATALITIES => [10i64],
            schema::AFFECTED => [100i64],
        )
        .unwrap();
        store.replace_events(&smaller).unwrap();

        let loaded = store.load_events().unwrap();
        assert_eq!(loaded.height(), 1);
    }

    #[test]
    fn missing_table_is_an_error() {
        let store = EventStore::open_in_memory(schema::DEFAULT_TABLE).unwrap();
        assert!(store.load_events().is_err());
    }
}
