pub mod reader;
pub mod writer;

pub use reader::{file_exists, SheetReader};
pub use writer::{default_output_path, prepare_output, SheetWriter};

use std::collections::HashMap;
use std::path::Path;

/// One record of the sheet, keyed by header. A missing key and an empty
/// string are both an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// The cell's text when it has any.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    pub fn is_empty_at(&self, column: &str) -> bool {
        self.text(column).is_none()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Headers plus rows of one sheet. Row 0 holds language display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularDocument {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl TabularDocument {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Builds a document from comma-separated lines, the first line being
    /// the headers. Short lines leave trailing cells empty.
    pub fn from_csv_str(text: &str) -> crate::utils::Result<Self> {
        reader::read_csv(text.trim().as_bytes())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Self::Csv,
            _ => Self::Workbook,
        }
    }
}
