use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::{archive_file_name, EntryRef, RecordSink, SinkError};
use crate::model::Record;

#[derive(Serialize)]
struct Archive<'a> {
    data: &'a Record,
}

/// Writes records as NOMAD archive JSON files into one directory.
///
/// Files are written to a temporary file in the target directory and then
/// renamed into place, so a reader never sees a partial archive. Rewriting
/// an entry with identical content leaves the file untouched; different
/// content is a [`SinkError::Conflict`] unless overwriting is enabled.
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    directory: PathBuf,
    upload_id: String,
    overwrite: bool,
}

impl ArchiveWriter {
    /// Writer into `directory` for upload `upload_id`
    pub fn new(directory: impl Into<PathBuf>, upload_id: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            upload_id: upload_id.into(),
            overwrite: false,
        }
    }

    /// Replace existing entries whose content differs
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Output directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path the record is written to
    pub fn path_for(&self, record: &Record) -> PathBuf {
        self.directory.join(archive_file_name(record))
    }

    fn render(record: &Record) -> Result<Vec<u8>, SinkError> {
        let mut bytes = serde_json::to_vec_pretty(&Archive { data: record })?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Existing content at `path`, if any
    fn existing(path: &Path) -> Result<Option<Vec<u8>>, SinkError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordSink for ArchiveWriter {
    fn check(&self, record: &Record) -> Result<(), SinkError> {
        if self.overwrite {
            return Ok(());
        }
        let path = self.path_for(record);
        match Self::existing(&path)? {
            Some(existing) if existing != Self::render(record)? => Err(SinkError::Conflict { path }),
            _ => Ok(()),
        }
    }

    fn write(&mut self, record: &Record) -> Result<EntryRef, SinkError> {
        let path = self.path_for(record);
        let bytes = Self::render(record)?;
        let entry = EntryRef::new(&self.upload_id, archive_file_name(record));

        match Self::existing(&path)? {
            Some(existing) if existing == bytes => {
                debug!("Unchanged archive {}", path.display());
                return Ok(entry);
            }
            Some(_) if !self.overwrite => return Err(SinkError::Conflict { path }),
            _ => {}
        }

        fs::create_dir_all(&self.directory)?;
        let mut temp = NamedTempFile::new_in(&self.directory)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&path)?;
        debug!("Wrote archive {} ({} bytes)", path.display(), bytes.len());

        Ok(entry)
    }
}
