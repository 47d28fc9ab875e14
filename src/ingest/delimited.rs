use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::cell::CellValue;
use super::workbook::{GridBuilder, Sheet, Workbook};
use super::TableError;

/// Read a CSV/TSV file as a single-sheet workbook named after the file stem
pub fn read_file(path: &Path, delimiter: u8) -> Result<Workbook, TableError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string();
    let file = File::open(path)?;
    let sheet = read_sheet(&name, BufReader::new(file), delimiter, 1)?;
    Ok(Workbook::single_sheet(sheet))
}

/// Read delimited text into a sheet.
///
/// `first_line` is the file line number of the first line the reader
/// yields; row numbers in errors refer to file lines.
pub fn read_sheet<R: Read>(
    name: &str,
    reader: R,
    delimiter: u8,
    first_line: usize,
) -> Result<Sheet, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut grid = GridBuilder::new(name);
    for (i, record) in csv_reader.byte_records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize + first_line - 1)
            .unwrap_or(i + first_line);

        let cells = record
            .iter()
            .map(|field| {
                std::str::from_utf8(field)
                    .map(CellValue::from_text)
                    .map_err(|e| format!("invalid UTF-8: {}", e))
            })
            .collect();
        grid.push_row(line, cells)?;
    }

    Ok(grid.finish()?)
}
