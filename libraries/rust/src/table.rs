//! Tabular views over JSON payloads.
//!
//! A [`Table`] is a polars [`DataFrame`] built from JSON records, plus the
//! name of the column acting as its row index. The index column stays in the
//! frame and may repeat values.

use crate::error::Error;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One flattened record: column name and cell, in payload order.
pub type Row = Vec<(String, Value)>;

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    frame: DataFrame,
    index: Option<String>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.frame.equals_missing(&other.frame)
    }
}

impl Table {
    pub fn empty() -> Self {
        Table::default()
    }

    /// One row per mapping record, one column per distinct key in first-seen
    /// order. Keys a record lacks become null. Nested values are kept as
    /// their JSON text.
    pub fn from_records(records: &[Value]) -> Result<Self, Error> {
        let rows = records.iter().filter_map(|record| match record {
            Value::Object(fields) => Some(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<Row>(),
            ),
            other => {
                tracing::warn!("Skipping non-mapping record: {}", other);
                None
            }
        });

        Table::from_rows(rows)
    }

    /// [`Table::from_records`] over the array stored under `key`.
    pub fn from_records_at(payload: &Value, key: &str) -> Result<Self, Error> {
        match payload.get(key) {
            Some(Value::Array(records)) => Table::from_records(records),
            Some(_) => Err(Error::Other(format!("Payload key {key} is not an array"))),
            None => Err(Error::Other(format!("Payload has no {key} key"))),
        }
    }

    /// Flatten a mapping into a single row with dot-joined column names, or an
    /// array of mappings into one flattened row each.
    pub fn normalize(value: &Value) -> Result<Self, Error> {
        Table::from_rows(normalized_rows(value))
    }

    /// Flatten the child records found under `record_path` of every parent,
    /// annotating each child row with the parent's value at `meta_path`. The
    /// meta column is named by joining `meta_path` with dots.
    pub fn normalize_records(
        parents: &[Value],
        record_path: &str,
        meta_path: &[&str],
    ) -> Result<Self, Error> {
        let meta_column = meta_path.join(".");
        let mut rows = Vec::new();

        for parent in parents {
            let children = match parent.get(record_path) {
                Some(Value::Array(children)) => children,
                _ => continue,
            };

            let meta = lookup(parent, meta_path).cloned().unwrap_or(Value::Null);

            for child in children {
                match child {
                    Value::Object(fields) => {
                        let mut row = flatten(fields);
                        row.push((meta_column.clone(), meta.clone()));
                        rows.push(row);
                    }
                    other => tracing::warn!("Skipping non-mapping child record: {}", other),
                }
            }
        }

        Table::from_rows(rows)
    }

    /// Build a frame from flattened rows. Columns are unioned in first-seen
    /// order; a column's type is the narrowest of boolean, integer, float and
    /// string that holds every non-null cell.
    pub fn from_rows<I>(rows: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut cells: Vec<(String, Vec<Value>)> = Vec::new();
        let mut height = 0;

        for row in rows {
            for (name, value) in row {
                let position = match positions.get(&name) {
                    Some(position) => *position,
                    None => {
                        positions.insert(name.clone(), cells.len());
                        cells.push((name, Vec::new()));
                        cells.len() - 1
                    }
                };

                let column = &mut cells[position].1;
                if column.len() > height {
                    column[height] = value;
                } else {
                    column.resize(height, Value::Null);
                    column.push(value);
                }
            }
            height += 1;
        }

        let columns = cells
            .into_iter()
            .map(|(name, mut values)| {
                values.resize(height, Value::Null);
                to_column(&name, &values)
            })
            .collect();

        let frame = DataFrame::new(columns)?;

        Ok(Table { frame, index: None })
    }

    /// Mark `name` as the row index. The column stays in the frame.
    pub fn set_index(mut self, name: &str) -> Result<Self, Error> {
        self.frame.column(name)?;
        self.index = Some(name.to_string());
        Ok(self)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Column names, without the index column.
    pub fn columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| Some(name) != self.index.as_ref())
            .collect()
    }

    pub fn index(&self) -> Option<Index> {
        let name = self.index.as_ref()?;
        Some(Index {
            name: name.clone(),
            values: self.column(name)?,
        })
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.columns().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0 && self.frame.width() == 0
    }

    /// Every cell of `name`, including the index column.
    pub fn column(&self, name: &str) -> Option<Vec<Value>> {
        let column = self.frame.column(name).ok()?;
        (0..column.len())
            .map(|row| column.get(row).ok().map(to_json))
            .collect()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<Value> {
        let column = self.frame.column(column).ok()?;
        column.get(row).ok().map(to_json)
    }

    /// Rows whose index value equals `key`, keeping the index. A table
    /// without an index selects nothing.
    pub fn select(&self, key: &Value) -> Result<Table, Error> {
        let name = match &self.index {
            Some(name) => name.as_str(),
            None => return Ok(Table::empty()),
        };

        let predicate = match key {
            Value::Null => col(name).is_null(),
            Value::Bool(flag) => col(name).eq(lit(*flag)),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => col(name).eq(lit(integer)),
                None => col(name).eq(lit(number.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(text) => col(name).eq(lit(text.clone())),
            other => col(name).eq(lit(other.to_string())),
        };

        let frame = self.frame.clone().lazy().filter(predicate).collect()?;

        Ok(Table {
            frame,
            index: self.index.clone(),
        })
    }
}

/// Dot-joined flattening of a mapping, in first-seen key order.
pub fn flatten(fields: &Map<String, Value>) -> Row {
    let mut row = Vec::new();
    flatten_into("", fields, &mut row);
    row
}

/// Rows of a mapping or an array of mappings, flattened.
pub(crate) fn normalized_rows(value: &Value) -> Vec<Row> {
    match value {
        Value::Object(fields) => vec![flatten(fields)],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(fields) => Some(flatten(fields)),
                other => {
                    tracing::warn!("Skipping non-mapping element: {}", other);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!("Cannot normalize scalar value: {}", other);
            Vec::new()
        }
    }
}

fn flatten_into(prefix: &str, fields: &Map<String, Value>, row: &mut Row) {
    for (key, value) in fields {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(&name, nested, row),
            _ => row.push((name, value.clone())),
        }
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

fn to_column(name: &str, values: &[Value]) -> Column {
    let mut present = values.iter().filter(|value| !value.is_null()).peekable();

    if present.peek().is_none() {
        return Column::new(name.into(), vec![None::<String>; values.len()]);
    }

    if present.clone().all(Value::is_boolean) {
        let cells: Vec<Option<bool>> = values.iter().map(Value::as_bool).collect();
        return Column::new(name.into(), cells);
    }

    if present.clone().all(Value::is_i64) {
        let cells: Vec<Option<i64>> = values.iter().map(Value::as_i64).collect();
        return Column::new(name.into(), cells);
    }

    if present.all(Value::is_number) {
        let cells: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
        return Column::new(name.into(), cells);
    }

    let cells: Vec<Option<String>> = values
        .iter()
        .map(|value| match value {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        })
        .collect();
    Column::new(name.into(), cells)
}

fn to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(flag) => Value::Bool(flag),
        AnyValue::Int64(integer) => Value::from(integer),
        AnyValue::Float64(float) => Value::from(float),
        AnyValue::String(text) => Value::String(text.to_string()),
        AnyValue::StringOwned(text) => Value::String(text.to_string()),
        other => Value::String(other.to_string()),
    }
}
