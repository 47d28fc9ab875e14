//! EPIC control-software log files.
//!
//! Layout:
//!
//! ```text
//! EPIC Log Export
//! Loop: SFC_Ga
//! Unit: °C
//! Date&Time	SFC_Ga.PV	SFC_Ga.SP
//! 13.05.2024 10:00:00	850.1	850.0
//! 13.05.2024 10:00:05	850.3	850.0
//! ```
//!
//! The preamble must mention `EPIC`. Its `key: value` lines are kept on the
//! workbook; the table starts at the first line whose first tab-separated
//! field is `Date&Time`.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use super::delimited;
use super::workbook::Workbook;
use super::{EncodingError, FormatError, TableError};

/// Name of the single sheet an EPIC log is read into
pub const EPIC_SHEET: &str = "EPIC";

/// Header of the timestamp column
pub const TIME_COLUMN: &str = "Date&Time";

/// Read an EPIC log file
pub fn read_file(path: &Path) -> Result<Workbook, TableError> {
    read_log(BufReader::new(File::open(path)?))
}

/// Read an EPIC log from any buffered reader
pub fn read_log<R: BufRead>(mut reader: R) -> Result<Workbook, TableError> {
    let mut preamble = Vec::new();
    let mut mentions_epic = false;
    let mut line_number = 0;
    let mut buffer = Vec::new();

    let header = loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Err(FormatError::InvalidEpicLog(format!(
                "no '{}' header line found",
                TIME_COLUMN
            ))
            .into());
        }
        line_number += 1;

        let line = std::str::from_utf8(&buffer).map_err(|e| EncodingError {
            sheet: EPIC_SHEET.to_string(),
            row: line_number,
            column: "preamble".to_string(),
            detail: format!("invalid UTF-8: {}", e),
        })?;
        let text = line.trim_end_matches(['\r', '\n']);
        let first_field = text.split('\t').next().unwrap_or("").trim();
        if first_field.eq_ignore_ascii_case(TIME_COLUMN) {
            break text.to_string();
        }

        if text.contains("EPIC") {
            mentions_epic = true;
        }
        if let Some((key, value)) = text.split_once(':') {
            preamble.push((key.trim().to_string(), value.trim().to_string()));
        } else if !text.trim().is_empty() {
            preamble.push((text.trim().to_string(), String::new()));
        }
    };

    if !mentions_epic {
        return Err(FormatError::InvalidEpicLog("preamble does not mention EPIC".to_string()).into());
    }

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    let mut table = header.into_bytes();
    table.push(b'\n');
    table.extend_from_slice(&rest);

    let sheet = delimited::read_sheet(EPIC_SHEET, Cursor::new(table), b'\t', line_number)?;
    Ok(Workbook::single_sheet(sheet).with_preamble(preamble))
}
