//! The table writer contract.
//!
//! [`TableWriter`] is the interface reporting code writes against. A writer
//! owns a fixed schema and at most one row in progress. Cells are set by
//! column index; the row is emitted by [`TableWriter::finish_row`]. The
//! `write_*` methods build and emit a whole row in one call.
//!
//! Implementors only provide the object-safe core (`columns`,
//! `has_active_row`, `set_value`, `finish_row`, `finish`); the typed setters
//! and whole-row helpers are provided on top of it.

use crate::error::{TableError, TableResult};
use crate::value::Value;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::{BuildHasher, Hash};

/// A row-at-a-time writer for a table with a fixed schema.
pub trait TableWriter {
    /// Column names, in order.
    fn columns(&self) -> &[String];

    /// Whether a row has been started but not yet finished.
    fn has_active_row(&self) -> bool;

    /// Store `value` in column `column` of the current row, starting a row if
    /// none is active.
    ///
    /// # Errors
    /// [`TableError::ColumnOutOfRange`] for a bad index, [`TableError::Closed`]
    /// after [`finish`](TableWriter::finish).
    fn set_value(&mut self, column: usize, value: Value) -> TableResult<()>;

    /// Emit the current row and flush the sink.
    ///
    /// With no active row this emits a row of empty fields.
    fn finish_row(&mut self) -> TableResult<()>;

    /// Emit any active row and close the sink. The writer is unusable after
    /// this returns.
    fn finish(&mut self) -> TableResult<()>;

    /// Number of columns in the schema.
    fn column_count(&self) -> usize {
        self.columns().len()
    }

    /// Set an integer cell.
    fn set_long(&mut self, column: usize, value: i64) -> TableResult<()> {
        self.set_value(column, Value::Int(value))
    }

    /// Set a floating-point cell.
    fn set_double(&mut self, column: usize, value: f64) -> TableResult<()> {
        self.set_value(column, Value::Float(value))
    }

    /// Set a text cell. `None` leaves the cell empty.
    fn set_text(&mut self, column: usize, value: Option<&str>) -> TableResult<()> {
        self.set_value(column, Value::from(value))
    }

    /// Write a whole row by position.
    ///
    /// Any active row is finished first. Values fill columns from 0; columns
    /// past the end of `row` are left empty.
    ///
    /// # Errors
    /// [`TableError::RowTooLong`] if `row` has more values than there are
    /// columns. Nothing is written in that case.
    fn write_row<I>(&mut self, row: I) -> TableResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
        Self: Sized,
    {
        let values: Vec<Value> = row.into_iter().map(Into::into).collect();
        let columns = self.column_count();
        if values.len() > columns {
            return Err(TableError::RowTooLong {
                len: values.len(),
                columns,
            });
        }
        if self.has_active_row() {
            self.finish_row()?;
        }
        for (i, v) in values.into_iter().enumerate() {
            self.set_value(i, v)?;
        }
        self.finish_row()
    }

    /// Write a whole row by looking up each column name.
    ///
    /// `lookup` is called once per column, in schema order. Columns it
    /// returns `None` for are left empty.
    fn write_by_name<F>(&mut self, mut lookup: F) -> TableResult<()>
    where
        F: FnMut(&str) -> Option<Value>,
        Self: Sized,
    {
        if self.has_active_row() {
            self.finish_row()?;
        }
        let cells: Vec<Option<Value>> = self
            .columns()
            .iter()
            .map(|c| lookup(c.as_str()))
            .collect();
        for (i, cell) in cells.into_iter().enumerate() {
            if let Some(v) = cell {
                self.set_value(i, v)?;
            }
        }
        self.finish_row()
    }

    /// Write a whole row from a map of column name to value.
    ///
    /// Values are written as their `Display` text. Keys that are not column
    /// names are ignored.
    fn write_named<K, V, S>(&mut self, values: &HashMap<K, V, S>) -> TableResult<()>
    where
        K: Borrow<str> + Hash + Eq,
        V: Display,
        S: BuildHasher,
        Self: Sized,
    {
        self.write_by_name(|name| values.get(name).map(|v| Value::Text(v.to_string())))
    }

    /// Write a whole row of arbitrary displayable values by position.
    ///
    /// `None` entries leave their column empty.
    fn write_display(&mut self, values: &[Option<&dyn Display>]) -> TableResult<()>
    where
        Self: Sized,
    {
        self.write_row(
            values
                .iter()
                .map(|v| match v {
                    Some(d) => Value::Text(d.to_string()),
                    None => Value::Null,
                }),
        )
    }

    /// Write a serializable struct or map as a row, matching field names to
    /// column names.
    ///
    /// # Errors
    /// [`TableError::NotARecord`] if `record` does not serialize to a map.
    fn write_record<T: Serialize>(&mut self, record: &T) -> TableResult<()>
    where
        Self: Sized,
    {
        let serde_json::Value::Object(fields) = serde_json::to_value(record)? else {
            return Err(TableError::NotARecord);
        };
        self.write_by_name(|name| fields.get(name).map(json_cell))
    }
}

fn json_cell(v: &serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match v {
        Json::Null => Value::Null,
        Json::String(s) => Value::Text(s.clone()),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map_or(Value::Text(n.to_string()), Value::Float)
            }
        }
        Json::Bool(b) => Value::Text(b.to_string()),
        other => Value::Text(other.to_string()),
    }
}
