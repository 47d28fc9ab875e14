use std::path::PathBuf;

use super::{archive_file_name, EntryRef, RecordSink, SinkError};
use crate::model::Record;

/// Keeps written records in memory, in write order
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    upload_id: String,
    entries: Vec<(EntryRef, Record)>,
}

impl MemorySink {
    /// Empty sink for upload `upload_id`
    pub fn new(upload_id: impl Into<String>) -> Self {
        Self {
            upload_id: upload_id.into(),
            entries: Vec::new(),
        }
    }

    /// Records written so far
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|(_, record)| record)
    }

    /// Entries written so far
    pub fn entries(&self) -> &[(EntryRef, Record)] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was written
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the sink, yielding its records
    pub fn into_records(self) -> Vec<Record> {
        self.entries.into_iter().map(|(_, record)| record).collect()
    }

    fn position(&self, file_name: &str) -> Option<usize> {
        self.entries.iter().position(|(e, _)| e.file_name == file_name)
    }
}

impl RecordSink for MemorySink {
    fn check(&self, record: &Record) -> Result<(), SinkError> {
        let file_name = archive_file_name(record);
        match self.position(&file_name) {
            Some(i) if &self.entries[i].1 != record => Err(SinkError::Conflict {
                path: PathBuf::from(file_name),
            }),
            _ => Ok(()),
        }
    }

    fn write(&mut self, record: &Record) -> Result<EntryRef, SinkError> {
        self.check(record)?;
        let entry = EntryRef::new(&self.upload_id, archive_file_name(record));
        if self.position(&entry.file_name).is_none() {
            self.entries.push((entry.clone(), record.clone()));
        }
        Ok(entry)
    }
}
