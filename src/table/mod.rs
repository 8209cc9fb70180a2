//! Aligns the series of a result set on a shared timestamp index and writes
//! them out as CSV: one row per distinct timestamp, one column per series.

use crate::error::Result;
use crate::tsdb::{ResultSet, Timestamp, Value};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::io::Write;

const TIMESTAMP_COLUMN: &str = "timestamp";
const UNLABELED_COLUMN: &str = "value";

pub struct Row {
    pub timestamp: Timestamp,
    /// One entry per column. `None` where that series has no sample at this
    /// timestamp.
    pub values: Vec<Option<Value>>,
}

pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(results: &ResultSet) -> Self {
        let indexed: Vec<_> = results.iter().map(|series| series.by_timestamp()).collect();

        let timestamps: BTreeSet<Timestamp> = indexed
            .iter()
            .flat_map(|samples| samples.keys().copied())
            .collect();

        let rows = timestamps
            .into_iter()
            .map(|timestamp| Row {
                timestamp,
                values: indexed
                    .iter()
                    .map(|samples| samples.get(&timestamp).copied())
                    .collect(),
            })
            .collect();

        Self {
            columns: column_names(results),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn write_header<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut line = String::from(TIMESTAMP_COLUMN);
        for column in &self.columns {
            line.push(',');
            line.push_str(&escape(column));
        }
        line.push('\n');

        out.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn write_rows<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut line = String::new();

        for row in &self.rows {
            line.clear();
            line.push_str(&row.timestamp.to_string());
            for value in &row.values {
                line.push(',');
                if let Some(value) = value {
                    line.push_str(&value.to_string());
                }
            }
            line.push('\n');

            out.write_all(line.as_bytes())?;
        }

        Ok(())
    }
}

/// Writes the CSV header line naming each series of `results`.
pub fn write_header<W: Write>(out: &mut W, results: &ResultSet) -> Result<()> {
    Table::new(results).write_header(out)
}

/// Writes one CSV line per distinct timestamp in `results`.
pub fn write_rows<W: Write>(out: &mut W, results: &ResultSet) -> Result<()> {
    Table::new(results).write_rows(out)
}

/// Column names in series order. Unlabeled series are called `value`, and a
/// name that is already taken gets a `_2`, `_3`, ... suffix.
pub fn column_names(results: &ResultSet) -> Vec<String> {
    let mut seen = HashSet::new();

    results
        .iter()
        .map(|series| {
            let base = if series.labels.is_empty() {
                UNLABELED_COLUMN.to_string()
            } else {
                series.labels.to_string()
            };

            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }

            name
        })
        .collect()
}

/// Quotes a CSV field if it contains a delimiter, quote or line break.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
