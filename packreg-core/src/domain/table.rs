//! Tabular snapshots handed to presentation layers

use serde::Serialize;

/// A rectangular grid of strings with a fixed column order.
///
/// Tables are owned copies taken at the time of the call; later changes to
/// the source collection are not reflected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    columns: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Rows are padded or truncated to the column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Restartable iterator over the rows
    pub fn rows(&self) -> impl Iterator<Item = &[String]> + Clone + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
