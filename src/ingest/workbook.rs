use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use super::cell::CellValue;
use super::columns::{clean_column_name, column_key, rename_block_columns};
use super::row::{starts_with_prefix, Header, RowRecord};
use super::{delimited, epic, spreadsheet, EncodingError, FormatError, TableError};

/// Header rows never start with this marker; it is skipped while looking for one.
const HEADER_COMMENT: &str = "#";

/// A named sheet: header plus data rows in file order
#[derive(Debug, Clone)]
pub struct Sheet {
    name: Arc<str>,
    header: Arc<Header>,
    header_row: usize,
    rows: Vec<(usize, Vec<CellValue>)>,
}

impl Sheet {
    /// Build a sheet from a grid of `(row_number, cells)` pairs.
    ///
    /// The first non-blank row that is not a `#` comment is the header; the
    /// rows after it are data. Returns `FormatError::EmptySheet` when no
    /// header row exists.
    pub fn from_grid(name: &str, grid: Vec<(usize, Vec<CellValue>)>) -> Result<Self, FormatError> {
        let mut rows = grid.into_iter();
        let (header_row, header_cells) = rows
            .by_ref()
            .find(|(_, cells)| {
                !cells.iter().all(CellValue::is_blank) && !starts_with_prefix(cells, HEADER_COMMENT)
            })
            .ok_or_else(|| FormatError::EmptySheet(name.to_string()))?;

        let names = header_cells
            .iter()
            .map(|cell| clean_column_name(&cell.to_string()))
            .collect();

        Ok(Self {
            name: Arc::from(name),
            header: Arc::new(Header::new(names)),
            header_row,
            rows: rows.collect(),
        })
    }

    /// Build a sheet from plain text rows, the first one being the header.
    /// Row numbers start at 1.
    pub fn from_text_rows<S: AsRef<str>>(name: &str, rows: &[Vec<S>]) -> Result<Self, FormatError> {
        let grid = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i + 1, row.iter().map(|c| CellValue::from_text(c.as_ref())).collect()))
            .collect();
        Self::from_grid(name, grid)
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sheet header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// 1-based row number of the header
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Number of data rows, blank rows included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check that every listed column is present
    pub fn require_columns<'a, I>(&self, columns: I) -> Result<(), FormatError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for column in columns {
            if !self.header.contains(column) {
                return Err(FormatError::MissingColumn {
                    sheet: self.name.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Rename repeated column blocks, see [`rename_block_columns`]
    pub fn rename_blocks(&mut self, initial: &str, members: &[String]) {
        let renamed = rename_block_columns(self.header.names(), initial, members);
        debug!("Sheet '{}': renamed column blocks starting at '{}'", self.name, initial);
        self.header = Arc::new(Header::new(renamed));
    }

    /// Iterate data rows in file order, skipping blank rows.
    ///
    /// Every call starts again from the first data row.
    pub fn rows(&self) -> SheetRows<'_> {
        SheetRows {
            sheet: self,
            position: 0,
            comment_prefix: None,
        }
    }
}

/// Lazy iterator over the data rows of a [`Sheet`]
#[derive(Debug, Clone)]
pub struct SheetRows<'a> {
    sheet: &'a Sheet,
    position: usize,
    comment_prefix: Option<String>,
}

impl<'a> SheetRows<'a> {
    /// Also skip rows whose first non-blank cell starts with `prefix`
    pub fn skip_comments(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = Some(prefix.into());
        self
    }
}

impl<'a> Iterator for SheetRows<'a> {
    type Item = RowRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((row, cells)) = self.sheet.rows.get(self.position) {
            self.position += 1;
            if cells.iter().all(CellValue::is_blank) {
                continue;
            }
            if let Some(prefix) = &self.comment_prefix {
                if starts_with_prefix(cells, prefix) {
                    continue;
                }
            }
            return Some(RowRecord::new(
                Arc::clone(&self.sheet.name),
                *row,
                Arc::clone(&self.sheet.header),
                cells.clone(),
            ));
        }
        None
    }
}

/// A set of named sheets read from one input file
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    source: Option<PathBuf>,
    sheets: Vec<Sheet>,
    preamble: Vec<(String, String)>,
    single_sheet: bool,
}

impl Workbook {
    /// Create a workbook from already built sheets
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self {
            source: None,
            sheets,
            preamble: Vec::new(),
            single_sheet: false,
        }
    }

    /// Workbook of a format without sheet names (CSV, TSV, EPIC log).
    ///
    /// Its only sheet answers every [`Workbook::sheet`] lookup.
    pub fn single_sheet(sheet: Sheet) -> Self {
        Self {
            single_sheet: true,
            ..Self::from_sheets(vec![sheet])
        }
    }

    /// Whether the input format has no sheet names
    pub fn is_single_sheet(&self) -> bool {
        self.single_sheet
    }

    /// Open a file, picking the reader from its extension.
    ///
    /// `.xlsx`, `.xlsm`, `.xls`, `.ods` are read as spreadsheets, `.csv` and
    /// `.tsv` as single-sheet workbooks and `.txt` as an EPIC log.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let mut workbook = match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => spreadsheet::read_workbook(path)?,
            "csv" => delimited::read_file(path, b',')?,
            "tsv" => delimited::read_file(path, b'\t')?,
            "txt" => epic::read_file(path)?,
            _ => return Err(FormatError::UnsupportedFile(path.display().to_string()).into()),
        };
        workbook.source = Some(path.to_path_buf());
        debug!(
            "Opened {} with {} sheet(s)",
            path.display(),
            workbook.sheets.len()
        );
        Ok(workbook)
    }

    pub(crate) fn with_preamble(mut self, preamble: Vec<(String, String)>) -> Self {
        self.preamble = preamble;
        self
    }

    /// Path the workbook was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// All sheets in file order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Mutable access to the sheets
    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    /// Sheet names in file order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// `key: value` lines found before the table (EPIC logs)
    pub fn preamble(&self) -> &[(String, String)] {
        &self.preamble
    }

    /// Look up a preamble entry by key, case-insensitively
    pub fn preamble_value(&self, key: &str) -> Option<&str> {
        let key = column_key(key);
        self.preamble
            .iter()
            .find(|(k, _)| column_key(k) == key)
            .map(|(_, v)| v.as_str())
    }

    fn named_position(&self, name: &str) -> Option<usize> {
        let key = column_key(name);
        self.sheets.iter().position(|s| column_key(s.name()) == key)
    }

    fn position(&self, name: &str) -> Option<usize> {
        match self.named_position(name) {
            Some(i) => Some(i),
            None if self.single_sheet && self.sheets.len() == 1 => Some(0),
            None => None,
        }
    }

    /// Find a sheet by name, case-insensitively.
    ///
    /// A single-sheet workbook (CSV, TSV, EPIC log) answers every lookup
    /// with its only sheet.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.position(name).map(|i| &self.sheets[i])
    }

    /// Find a sheet by its actual name only, ignoring the single-sheet rule
    pub fn sheet_named(&self, name: &str) -> Option<&Sheet> {
        self.named_position(name).map(|i| &self.sheets[i])
    }

    /// Mutable variant of [`Workbook::sheet`]
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.position(name).map(move |i| &mut self.sheets[i])
    }

    /// Like [`Workbook::sheet`] but a missing sheet is a `FormatError`
    pub fn require_sheet(&self, name: &str) -> Result<&Sheet, FormatError> {
        self.sheet(name)
            .ok_or_else(|| FormatError::MissingSheet(name.to_string()))
    }
}

/// Collects converted cells row by row and names the column of any cell that
/// failed to decode.
pub(crate) struct GridBuilder {
    sheet: String,
    header: Option<Vec<String>>,
    rows: Vec<(usize, Vec<CellValue>)>,
}

impl GridBuilder {
    pub(crate) fn new(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            header: None,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push_row(
        &mut self,
        row: usize,
        cells: Vec<Result<CellValue, String>>,
    ) -> Result<(), EncodingError> {
        let mut converted = Vec::with_capacity(cells.len());
        for (i, cell) in cells.into_iter().enumerate() {
            match cell {
                Ok(value) => converted.push(value),
                Err(detail) => {
                    let column = self
                        .header
                        .as_ref()
                        .and_then(|h| h.get(i).cloned())
                        .unwrap_or_else(|| format!("column {}", i + 1));
                    return Err(EncodingError {
                        sheet: self.sheet.clone(),
                        row,
                        column,
                        detail,
                    });
                }
            }
        }

        if self.header.is_none()
            && !converted.iter().all(CellValue::is_blank)
            && !starts_with_prefix(&converted, HEADER_COMMENT)
        {
            self.header = Some(
                converted
                    .iter()
                    .map(|c| clean_column_name(&c.to_string()))
                    .collect(),
            );
        }
        self.rows.push((row, converted));
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Sheet, FormatError> {
        Sheet::from_grid(&self.sheet, self.rows)
    }
}
