/// Structural problems with an input file
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// I/O error reading the input file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Spreadsheet container could not be opened or decoded
    #[error("Spreadsheet error: {0}")]
    WorkbookError(#[from] calamine::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// File extension does not map to a supported reader
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    /// A sheet the template requires is absent
    #[error("Missing required sheet: {0}")]
    MissingSheet(String),

    /// A column the template requires is absent
    #[error("Missing required column '{column}' in sheet '{sheet}'")]
    MissingColumn {
        /// Sheet that was searched
        sheet: String,
        /// Column that was not found
        column: String,
    },

    /// Sheet has no header row
    #[error("Sheet '{0}' is empty")]
    EmptySheet(String),

    /// EPIC log does not follow the expected layout
    #[error("Invalid EPIC log: {0}")]
    InvalidEpicLog(String),
}

/// Unreadable cell content
#[derive(Debug, thiserror::Error)]
#[error("Unreadable cell in sheet '{sheet}' row {row} column '{column}': {detail}")]
pub struct EncodingError {
    /// Sheet containing the cell
    pub sheet: String,
    /// 1-based spreadsheet row number
    pub row: usize,
    /// Column header of the cell
    pub column: String,
    /// What was wrong with the content
    pub detail: String,
}

/// Any error raised while reading tabular input
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Structural file problem
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Cell content could not be decoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::Format(FormatError::IoError(err))
    }
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        TableError::Format(FormatError::CsvError(err))
    }
}

impl From<calamine::Error> for TableError {
    fn from(err: calamine::Error) -> Self {
        TableError::Format(FormatError::WorkbookError(err))
    }
}
