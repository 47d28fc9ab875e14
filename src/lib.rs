//! # pdi-ingest - Lab Exports to NOMAD Records
//!
//! `pdi_ingest` reads the spreadsheets and logs produced around an MBE lab and
//! turns them into typed, cross-referenced records ready to be written as
//! NOMAD archive entries.
//!
//! ## Key Features
//!
//! - **Template-Driven Mapping**: Every column of every supported sheet is
//!   declared in a [`template::TemplateRegistry`] (type, unit, default,
//!   allowed values). Templates can be replaced from TOML without touching
//!   code.
//!
//! - **Unit Normalisation**: Quantities are converted to canonical units
//!   (g, ml, K, s, ...) when rows are mapped, so sums never mix scales.
//!
//! - **Resolved References**: Solutions reference earlier solutions, growth
//!   runs reference substrates, and EPIC log channels link to configured
//!   sources. Unknown or forward references fail with the offending cell.
//!
//! - **Measured Beats Calculated**: Totals are always calculated; a value
//!   recorded by the operator overrides the calculation without discarding it.
//!
//! - **All or Nothing**: A pass either produces every record of a file or
//!   fails with the first error; nothing is written for a failed pass.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdi_ingest::emit::ArchiveWriter;
//! use pdi_ingest::pipeline::IngestionPass;
//! use pdi_ingest::template::TemplateRegistry;
//!
//! let templates = TemplateRegistry::builtin();
//! let pass = IngestionPass::new(&templates);
//!
//! // Kind is detected from the sheets and columns present
//! let output = pass.run_file("growth_2024-05-13.xlsx", None)?;
//! println!("{}: {} records", output.kind, output.records.len());
//!
//! let mut sink = ArchiveWriter::new("archives", "upload-1");
//! for entry in IngestionPass::emit(&output.records, &mut sink)? {
//!     println!("{} -> {}", entry.file_name, entry.reference);
//! }
//! # Ok::<(), pdi_ingest::pipeline::PipelineError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ingest ─► mapping ─► assemble ─► derive ─► emit
//!   │          ▲                              │
//!   │       template                          ▼
//!   └──────────────── pipeline ──────── RecordSink
//! ```
//!
//! - [`ingest`]: spreadsheets, CSV/TSV and EPIC logs as [`ingest::Workbook`]s
//! - [`template`]: per-process column templates and kind detection
//! - [`mapping`]: coercion of rows into typed attribute values
//! - [`assemble`]: grouping rows into records and resolving references
//! - [`derive`]: totals, proportions, concentrations and durations
//! - [`model`]: the record types
//! - [`emit`]: archive JSON writer and in-memory sink
//! - [`pipeline`]: one ingestion pass over a file
//! - [`units`]: unit parsing and conversion
//!
//! ## Supported Process Types
//!
//! | Kind | Sheets | Records |
//! |------|--------|---------|
//! | `solution_preparation` | `Precursors` | `Solution` |
//! | `mbe_growth` | `Substrate`, `Overview`, `GrowthRun` | `Substrate`, `GrowthRun` |
//! | `mbe_sources` | `MBE sources`, `MBE gas mixing` (optional) | `Instrument` |
//! | `epic_log` | EPIC `.txt` export | `EpicLog` |

pub mod assemble;
pub mod derive;
pub mod emit;
pub mod ingest;
pub mod mapping;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod template;
pub mod units;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assemble::{AssemblyError, ReferenceError};
    pub use crate::emit::{ArchiveWriter, EntryRef, MemorySink, RecordSink, SinkError};
    pub use crate::ingest::{CellValue, FormatError, RowRecord, Sheet, Workbook};
    pub use crate::mapping::{FieldMapper, TypedRow, TypedValue, ValidationError, ValidationIssue};
    pub use crate::model::{
        Component, ComponentRole, EpicLog, GrowthRun, HasComponents, HasTotals, Identified,
        InstrumentConfiguration, Record, ResolvedValue, Solution, Substrate,
    };
    pub use crate::pipeline::{IngestionPass, PassOutput, PipelineError};
    pub use crate::report::InspectionReport;
    pub use crate::template::{ProcessKind, ProcessTemplate, TemplateRegistry};
    pub use crate::units::{Dimension, Unit};
}
