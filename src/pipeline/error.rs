use crate::assemble::{AssemblyError, ReferenceError};
use crate::emit::SinkError;
use crate::ingest::{EncodingError, FormatError, TableError};
use crate::mapping::ValidationError;
use crate::template::TemplateError;

/// Any error that aborts an ingestion pass
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input file structure does not match the template
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Cell content could not be decoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Template definitions are invalid or missing
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A value or record-level rule is violated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A reference cannot be resolved
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Records could not be emitted
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// No template matches the input's sheets and columns
    #[error("Cannot determine the process type of '{0}'")]
    UndetectedKind(String),
}

impl From<TableError> for PipelineError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::Format(e) => PipelineError::Format(e),
            TableError::Encoding(e) => PipelineError::Encoding(e),
        }
    }
}

impl From<AssemblyError> for PipelineError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::Validation(e) => PipelineError::Validation(e),
            AssemblyError::Reference(e) => PipelineError::Reference(e),
        }
    }
}
