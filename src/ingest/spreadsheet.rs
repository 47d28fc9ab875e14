use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;

use super::cell::CellValue;
use super::workbook::{GridBuilder, Workbook};
use super::TableError;

/// Read every sheet of an `.xlsx/.xls/.ods` file
pub fn read_workbook(path: &Path) -> Result<Workbook, TableError> {
    let mut reader = open_workbook_auto(path)?;
    let mut sheets = Vec::new();

    for name in reader.sheet_names() {
        let range = reader.worksheet_range(&name)?;
        // Ranges skip leading empty rows; keep spreadsheet row numbers intact.
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let mut grid = GridBuilder::new(&name);
        for (i, row) in range.rows().enumerate() {
            let cells = row.iter().map(convert_cell).collect();
            grid.push_row(first_row + i + 1, cells)?;
        }
        match grid.finish() {
            Ok(sheet) => sheets.push(sheet),
            // Empty sheets are legal in a workbook, templates decide whether
            // they are required.
            Err(_) => log::debug!("Skipping empty sheet '{}'", name),
        }
    }

    Ok(Workbook::from_sheets(sheets))
}

fn convert_cell(cell: &Data) -> Result<CellValue, String> {
    Ok(match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::from_text(s)),
        Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(e) => return Err(format!("spreadsheet error value {:?}", e)),
    })
}
