use std::collections::HashMap;
use std::sync::Arc;

use super::cell::CellValue;
use super::columns::column_key;

/// Column names of a sheet with case-insensitive lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Build a header from cleaned column names.
    ///
    /// When a name repeats, lookups resolve to its first occurrence.
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                continue;
            }
            index.entry(column_key(name)).or_insert(i);
        }
        Self { names, index }
    }

    /// Column names in sheet order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column, matched case-insensitively
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(&column_key(column)).copied()
    }

    /// Whether the header contains the column
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the header has no columns
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One spreadsheet row keyed by column name
#[derive(Debug, Clone)]
pub struct RowRecord {
    sheet: Arc<str>,
    row: usize,
    header: Arc<Header>,
    cells: Vec<CellValue>,
}

impl RowRecord {
    /// Create a row record. `row` is the 1-based spreadsheet row number.
    pub fn new(sheet: Arc<str>, row: usize, header: Arc<Header>, cells: Vec<CellValue>) -> Self {
        Self {
            sheet,
            row,
            header,
            cells,
        }
    }

    /// Name of the sheet the row came from
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// 1-based spreadsheet row number
    pub fn row(&self) -> usize {
        self.row
    }

    /// Header shared by all rows of the sheet
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Cell under `column`; missing columns and short rows read as empty
    pub fn get(&self, column: &str) -> &CellValue {
        self.header
            .position(column)
            .and_then(|i| self.cells.get(i))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cell at a column position
    pub fn get_index(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    /// Iterate `(column, cell)` pairs in sheet order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.header
            .names()
            .iter()
            .enumerate()
            .map(move |(i, name)| (name.as_str(), self.get_index(i)))
    }

    /// True when every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }

    /// Whether the first non-blank cell is text starting with `prefix`
    pub fn starts_with(&self, prefix: &str) -> bool {
        starts_with_prefix(&self.cells, prefix)
    }
}

pub(crate) fn starts_with_prefix(cells: &[CellValue], prefix: &str) -> bool {
    cells
        .iter()
        .find(|c| !c.is_blank())
        .and_then(CellValue::as_text)
        .is_some_and(|t| t.trim_start().starts_with(prefix))
}
