use crate::mapping::ValidationError;

/// A row names a record that was not defined earlier in the pass
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown {kind} '{identifier}' referenced in sheet '{sheet}' row {row} column '{column}'")]
pub struct ReferenceError {
    /// Sheet of the referencing row
    pub sheet: String,
    /// 1-based spreadsheet row number
    pub row: usize,
    /// Column holding the identifier
    pub column: String,
    /// Identifier that could not be resolved
    pub identifier: String,
    /// Kind of record that was looked up
    pub kind: &'static str,
}

/// Errors raised while assembling records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    /// A value or record-level rule is violated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A reference cannot be resolved
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}
