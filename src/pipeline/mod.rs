//! # Ingestion Pass
//!
//! Wires the stages together for one input file:
//!
//! ```text
//! Workbook ─► FieldMapper (per sheet) ─► assemble_* ─► Vec<Record> ─► RecordSink
//! ```
//!
//! A pass is a plain function of its inputs: the [`TemplateRegistry`] is
//! passed in explicitly and the identifier registries live only for the
//! duration of [`IngestionPass::run_workbook`]. The first error aborts the
//! pass and nothing is handed to a sink, because [`IngestionPass::emit`]
//! checks every record before writing the first one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pdi_ingest::emit::ArchiveWriter;
//! use pdi_ingest::pipeline::IngestionPass;
//! use pdi_ingest::template::TemplateRegistry;
//!
//! let templates = TemplateRegistry::builtin();
//! let pass = IngestionPass::new(&templates);
//!
//! let output = pass.run_file("precursors.xlsx", None)?;
//! let mut sink = ArchiveWriter::new("archives", "upload-1");
//! IngestionPass::emit(&output.records, &mut sink)?;
//! # Ok::<(), pdi_ingest::pipeline::PipelineError>(())
//! ```

mod error;

#[cfg(test)]
mod tests;

use std::path::Path;

use log::{debug, info, warn};

use crate::assemble::{assemble_epic, assemble_growth, assemble_instrument, assemble_solutions};
use crate::emit::{EntryRef, RecordSink};
use crate::ingest::{FormatError, Workbook};
use crate::mapping::{FieldMapper, TypedRow};
use crate::model::{InstrumentConfiguration, Record};
use crate::template::{builtin, ProcessKind, ProcessTemplate, TemplateError, TemplateRegistry};

pub use error::PipelineError;

/// Records produced from one input
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutput {
    /// Process type the input was parsed as
    pub kind: ProcessKind,
    /// Input name, used for records named after their file
    pub name: String,
    /// Records in emission order
    pub records: Vec<Record>,
}

/// One synchronous ingestion pass over an input file
#[derive(Debug, Clone, Copy)]
pub struct IngestionPass<'a> {
    templates: &'a TemplateRegistry,
    instrument: Option<&'a InstrumentConfiguration>,
}

impl<'a> IngestionPass<'a> {
    /// Pass using `templates`
    pub fn new(templates: &'a TemplateRegistry) -> Self {
        Self {
            templates,
            instrument: None,
        }
    }

    /// Link EPIC log channels to the sources of `instrument`
    pub fn with_instrument(mut self, instrument: &'a InstrumentConfiguration) -> Self {
        self.instrument = Some(instrument);
        self
    }

    /// Open and parse a file. The process kind is detected when `kind` is `None`.
    pub fn run_file<P: AsRef<Path>>(
        &self,
        path: P,
        kind: Option<ProcessKind>,
    ) -> Result<PassOutput, PipelineError> {
        let path = path.as_ref();
        let workbook = Workbook::open(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input")
            .to_string();
        self.run_workbook(&workbook, kind, &name)
    }

    /// Process kind of a workbook according to the registered templates
    pub fn detect(&self, workbook: &Workbook, name: &str) -> Result<ProcessKind, PipelineError> {
        self.templates
            .detect(workbook)
            .ok_or_else(|| PipelineError::UndetectedKind(name.to_string()))
    }

    /// Parse an opened workbook
    pub fn run_workbook(
        &self,
        workbook: &Workbook,
        kind: Option<ProcessKind>,
        name: &str,
    ) -> Result<PassOutput, PipelineError> {
        let kind = match kind {
            Some(kind) => kind,
            None => {
                let kind = self.detect(workbook, name)?;
                debug!("Detected '{}' as {}", name, kind);
                kind
            }
        };
        let template = self.templates.get(kind)?;
        info!("Parsing '{}' as {}", name, kind);

        let records = match kind {
            ProcessKind::SolutionPreparation => {
                let rows = typed_rows(workbook, template, builtin::solution::SHEET)?;
                assemble_solutions(&rows)?
                    .into_iter()
                    .map(Record::Solution)
                    .collect()
            }
            ProcessKind::MbeGrowth => {
                use builtin::growth::*;
                let substrates = typed_rows(workbook, template, SUBSTRATE_SHEET)?;
                let overview = typed_rows(workbook, template, OVERVIEW_SHEET)?;
                let steps = typed_rows(workbook, template, GROWTH_RUN_SHEET)?;
                let growth = assemble_growth(&substrates, &overview, &steps)?;
                growth
                    .substrates
                    .into_iter()
                    .map(Record::Substrate)
                    .chain(growth.runs.into_iter().map(Record::GrowthRun))
                    .collect()
            }
            ProcessKind::MbeSources => {
                use builtin::sources::*;
                let sources = typed_rows(workbook, template, SOURCES_SHEET)?;
                let gas = typed_rows(workbook, template, GAS_SHEET)?;
                vec![Record::Instrument(assemble_instrument(name, &sources, &gas)?)]
            }
            ProcessKind::EpicLog => {
                let rows = typed_rows(workbook, template, crate::ingest::epic::EPIC_SHEET)?;
                vec![Record::EpicLog(assemble_epic(
                    name,
                    workbook.preamble(),
                    &rows,
                    self.instrument,
                )?)]
            }
        };

        info!("Parsed '{}': {} record(s)", name, records.len());
        Ok(PassOutput {
            kind,
            name: name.to_string(),
            records,
        })
    }

    /// Hand records to a sink.
    ///
    /// The whole batch is checked first; a failed check writes nothing.
    pub fn emit(records: &[Record], sink: &mut dyn RecordSink) -> Result<Vec<EntryRef>, PipelineError> {
        sink.check_all(records)?;
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            entries.push(sink.write(record)?);
        }
        info!("Emitted {} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
        Ok(entries)
    }
}

/// Map the rows of one template sheet. An absent optional sheet yields no rows.
fn typed_rows(
    workbook: &Workbook,
    template: &ProcessTemplate,
    sheet_name: &str,
) -> Result<Vec<TypedRow>, PipelineError> {
    let sheet_template = template
        .sheet(sheet_name)
        .ok_or_else(|| TemplateError::MissingSheetTemplate {
            kind: template.kind,
            sheet: sheet_name.to_string(),
        })?;

    let Some(found) = sheet_template.locate(workbook) else {
        if sheet_template.required {
            return Err(FormatError::MissingSheet(sheet_template.sheet.clone()).into());
        }
        debug!("Optional sheet '{}' not present", sheet_template.sheet);
        return Ok(Vec::new());
    };

    let mut sheet = found.clone();
    if let Some(block) = &sheet_template.block {
        let members: Vec<String> = block.fields.iter().map(|f| f.column.clone()).collect();
        sheet.rename_blocks(&block.initial, &members);
    }

    let mapper = FieldMapper::new(sheet_template, sheet.name(), sheet.header())?;
    if !mapper.ignored_columns().is_empty() {
        warn!(
            "Sheet '{}': ignoring unmapped column(s) {:?}",
            sheet.name(),
            mapper.ignored_columns()
        );
    }

    let mut rows = sheet.rows();
    if let Some(prefix) = &sheet_template.comment_prefix {
        rows = rows.skip_comments(prefix.clone());
    }
    let typed = rows.map(|row| mapper.map(&row)).collect::<Result<Vec<_>, _>>()?;
    debug!(
        "Sheet '{}': {} row(s), {} column block(s)",
        sheet.name(),
        typed.len(),
        mapper.block_count()
    );
    Ok(typed)
}
