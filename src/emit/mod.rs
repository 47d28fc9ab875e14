//! # Schema Emitter
//!
//! Hands finished [`Record`]s to a [`RecordSink`].
//!
//! - [`ArchiveWriter`] writes one `<entry>.archive.json` file per record, the
//!   layout a NOMAD upload expects
//! - [`MemorySink`] keeps records in memory for tests and inspection
//!
//! Every entry gets an [`EntryRef`] whose identifier is a UUID v5 of the
//! upload ID and file name, so re-running a pass over the same input yields
//! the same references.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pdi_ingest::emit::{ArchiveWriter, RecordSink};
//! use pdi_ingest::model::{Record, Solution};
//!
//! let mut sink = ArchiveWriter::new("archives", "upload-1");
//! let entry = sink.write(&Record::Solution(Solution::new("S1")))?;
//! println!("{}", entry.reference);
//! # Ok::<(), pdi_ingest::emit::SinkError>(())
//! ```

mod archive;
mod error;
mod memory;

#[cfg(test)]
mod tests;

use uuid::Uuid;

pub use archive::ArchiveWriter;
pub use error::SinkError;
pub use memory::MemorySink;

use crate::model::Record;

/// File name suffix of archive entries
pub const ARCHIVE_SUFFIX: &str = ".archive.json";

/// Destination of the records of a pass
pub trait RecordSink {
    /// Check that `record` can be written without writing it.
    ///
    /// A pass checks every record before writing the first one.
    fn check(&self, _record: &Record) -> Result<(), SinkError> {
        Ok(())
    }

    /// Check a whole batch: no two different records may share a file
    /// name, and every record must pass [`RecordSink::check`].
    fn check_all(&self, records: &[Record]) -> Result<(), SinkError> {
        let mut seen: Vec<(String, &Record)> = Vec::with_capacity(records.len());
        for record in records {
            let file_name = archive_file_name(record);
            match seen.iter().find(|(name, _)| *name == file_name) {
                Some((_, first)) if *first != record => {
                    return Err(SinkError::DuplicateEntry { file_name });
                }
                Some(_) => {}
                None => seen.push((file_name, record)),
            }
            self.check(record)?;
        }
        Ok(())
    }

    /// Write one record
    fn write(&mut self, record: &Record) -> Result<EntryRef, SinkError>;
}

/// Handle to an emitted entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRef {
    /// Archive file name
    pub file_name: String,
    /// Deterministic entry identifier
    pub entry_id: String,
    /// Reference usable from other archives
    pub reference: String,
}

impl EntryRef {
    /// Reference to `file_name` inside upload `upload_id`
    pub fn new(upload_id: &str, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let entry_id = entry_id(upload_id, &file_name);
        Self {
            reference: format!("../uploads/{}/archive/{}#data", upload_id, entry_id),
            entry_id,
            file_name,
        }
    }
}

/// UUID v5 of `<upload_id>/<file_name>`, in simple form
pub fn entry_id(upload_id: &str, file_name: &str) -> String {
    let name = format!("{}/{}", upload_id, file_name);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
        .simple()
        .to_string()
}

/// Archive file name of a record.
///
/// `%` and path separators are percent-escaped, so distinct records never
/// share a name.
pub fn archive_file_name(record: &Record) -> String {
    let stem = record.entry_name();
    let mut name = String::with_capacity(stem.len() + ARCHIVE_SUFFIX.len());
    for c in stem.chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            c => name.push(c),
        }
    }
    name.push_str(ARCHIVE_SUFFIX);
    name
}
