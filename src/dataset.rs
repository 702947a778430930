//! Row-major listing tables.
//!
//! [`Frame`] is the mutable working table the loader cleans in place.
//! [`Dataset`] is the frozen result: it exposes read-only accessors only, so a
//! cleaned dataset shared through the cache can never be altered by a filter
//! pass.

use std::path::{Path, PathBuf};

use crate::{
    data::{Value, parse_cell},
    loader::LoadReport,
    schema::{ColumnMeta, ColumnType, infer_columns},
};

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: Vec<ColumnMeta>,
    rows: Vec<Row>,
}

impl Frame {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Builds a typed frame from decoded text records, inferring each
    /// column's type. Short records are padded with missing cells.
    pub fn from_records(
        headers: Vec<String>,
        records: Vec<Vec<String>>,
        forced_text: &[&str],
    ) -> Self {
        let columns = infer_columns(&headers, &records, forced_text);
        let rows = records
            .into_iter()
            .map(|record| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| {
                        record
                            .get(idx)
                            .and_then(|raw| parse_cell(raw, &column.datatype))
                    })
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_type(&self, index: usize) -> ColumnType {
        self.columns[index].datatype
    }

    pub fn set_column_type(&mut self, index: usize, datatype: ColumnType) {
        self.columns[index].datatype = datatype;
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&Value>> {
        self.rows.iter().map(move |row| row[index].as_ref())
    }

    /// Replaces every cell of a column with `f(cell)`.
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(Option<Value>) -> Option<Value>,
    {
        for row in &mut self.rows {
            let cell = row[index].take();
            row[index] = f(cell);
        }
    }

    /// Appends a column, or overwrites an existing column of the same name.
    pub fn put_column(&mut self, name: &str, datatype: ColumnType, values: Vec<Option<Value>>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(index) => {
                self.columns[index].datatype = datatype;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(ColumnMeta::new(name, datatype));
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Keeps rows for which `keep` holds, preserving order. Returns the number
    /// of rows removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }
}

/// An immutable, cleaned listing table.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: Frame,
    source: PathBuf,
    report: LoadReport,
}

impl Dataset {
    pub(crate) fn new(frame: Frame, source: PathBuf, report: LoadReport) -> Self {
        Self {
            frame,
            source,
            report,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        self.frame.columns()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        self.frame.rows()
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.frame.column_index(name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.frame.rows().get(row)?.get(column)?.as_ref()
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&Value>> {
        self.frame.column_values(index)
    }
}
