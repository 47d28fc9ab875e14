//! # Tabular Ingestor
//!
//! Reads lab exports into [`Workbook`]s: named [`Sheet`]s whose data rows come
//! out as [`RowRecord`]s in file row order.
//!
//! ## Supported Inputs
//!
//! - **Spreadsheets** (`.xlsx`, `.xls`, `.ods`) via calamine, one [`Sheet`]
//!   per worksheet
//! - **CSV/TSV** exports, read as a single sheet
//! - **EPIC logs** (`.txt`), see [`epic`]
//!
//! Rows are produced lazily and the iterator can be restarted by calling
//! [`Sheet::rows`] again; reading a file has no side effects beyond the read.

mod cell;
pub mod columns;
pub mod delimited;
pub mod epic;
mod error;
mod row;
mod spreadsheet;
mod workbook;


pub use cell::{format_number, CellValue};
pub use error::{EncodingError, FormatError, TableError};
pub use row::{Header, RowRecord};
pub use workbook::{Sheet, SheetRows, Workbook};
