//! # Column Templates
//!
//! A template describes, per supported process type, which sheets a file
//! must contain and how each column maps to a typed attribute (kind, unit,
//! default, allowed values). Templates are the only configuration surface of
//! the pipeline: they are enumerated per [`ProcessKind`] and never
//! discovered from the file itself.
//!
//! Built-in templates live in [`builtin`]; a [`TemplateRegistry`] holding
//! them is constructed once per run and passed to the pipeline. Any template
//! can be replaced from TOML:
//!
//! ```toml
//! [[templates]]
//! kind = "solution_preparation"
//! description = "Precursor solutions"
//!
//! [[templates.sheets]]
//! sheet = "Precursors"
//!
//! [[templates.sheets.fields]]
//! column = "Solution ID"
//! attribute = "solution_id"
//! kind = { type = "text" }
//! required = true
//! ```

pub mod builtin;
mod error;


use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::ingest::{Sheet, Workbook};
use crate::units::Unit;

pub use error::TemplateError;

/// Supported process / file types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// Solution (precursor) preparation sheet
    SolutionPreparation,
    /// MBE growth-run workbook
    MbeGrowth,
    /// MBE instrument source configuration
    MbeSources,
    /// EPIC control-software log
    EpicLog,
}

impl ProcessKind {
    /// All kinds, in detection order
    pub const ALL: [ProcessKind; 4] = [
        ProcessKind::EpicLog,
        ProcessKind::MbeSources,
        ProcessKind::MbeGrowth,
        ProcessKind::SolutionPreparation,
    ];

    /// Identifier used in TOML and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessKind::SolutionPreparation => "solution_preparation",
            ProcessKind::MbeGrowth => "mbe_growth",
            ProcessKind::MbeSources => "mbe_sources",
            ProcessKind::EpicLog => "epic_log",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic type of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text / identifiers
    Text,
    /// Numeric quantity; values are converted from `unit` to the canonical
    /// unit of its dimension. Without a unit the number is kept as is.
    Number {
        /// Unit the column is recorded in
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Whole number
    Integer,
    /// Yes/no flag
    Bool,
    /// One of a fixed set of values (case-insensitive exact match)
    Enum {
        /// Allowed values in canonical spelling
        allowed: Vec<String>,
    },
    /// Date and time
    DateTime,
}

impl FieldKind {
    /// Number field recorded in `unit`
    pub fn number(unit: &str) -> Self {
        FieldKind::Number {
            unit: Some(unit.to_string()),
        }
    }

    /// Enumerated field
    pub fn one_of(allowed: &[&str]) -> Self {
        FieldKind::Enum {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Default applied to blank cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// Boolean default
    Bool(bool),
    /// Numeric default, in the column's unit
    Number(f64),
    /// Text / enum default
    Text(String),
}

/// Mapping of one column onto a typed attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column header in the sheet
    pub column: String,
    /// Attribute name the assembler reads
    pub attribute: String,
    /// Expected type
    pub kind: FieldKind,
    /// Whether the column must be present in the sheet
    #[serde(default)]
    pub required: bool,
    /// Value used for blank cells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

impl FieldSpec {
    /// Optional column
    pub fn new(column: &str, attribute: &str, kind: FieldKind) -> Self {
        Self {
            column: column.to_string(),
            attribute: attribute.to_string(),
            kind,
            required: false,
            default: None,
        }
    }

    /// Mark the column as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default for blank cells
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// Repeated group of columns, e.g. one block per MBE source in a growth step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBlock {
    /// Column that opens each block
    pub initial: String,
    /// Fields of one block, the initial column included
    pub fields: Vec<FieldSpec>,
}

/// Expected layout of one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetTemplate {
    /// Sheet name
    pub sheet: String,
    /// Whether the sheet must exist
    #[serde(default = "default_true")]
    pub required: bool,
    /// Rows whose first non-blank cell starts with this are skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_prefix: Option<String>,
    /// Column mappings
    pub fields: Vec<FieldSpec>,
    /// Repeated column block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<ColumnBlock>,
    /// Kind applied to columns that no field names (kept under their header)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<FieldKind>,
}

fn default_true() -> bool {
    true
}

impl SheetTemplate {
    /// Required sheet without comment handling
    pub fn new(sheet: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            sheet: sheet.to_string(),
            required: true,
            comment_prefix: None,
            fields,
            block: None,
            passthrough: None,
        }
    }

    /// Column mapped to `attribute`, searching block fields as well
    pub fn column_for(&self, attribute: &str) -> Option<&str> {
        self.fields
            .iter()
            .chain(self.block.iter().flat_map(|b| b.fields.iter()))
            .find(|f| f.attribute == attribute)
            .map(|f| f.column.as_str())
    }

    /// Columns that must be present
    pub fn required_columns(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.column.as_str())
    }

    fn validate(&self) -> Result<(), TemplateError> {
        let mut attributes = HashSet::new();
        let block_fields = self.block.iter().flat_map(|b| b.fields.iter());
        for field in self.fields.iter().chain(block_fields) {
            if !attributes.insert(field.attribute.as_str()) {
                return Err(TemplateError::DuplicateAttribute {
                    sheet: self.sheet.clone(),
                    attribute: field.attribute.clone(),
                });
            }
            match &field.kind {
                FieldKind::Number { unit: Some(unit) } if Unit::parse(unit).is_none() => {
                    return Err(TemplateError::UnknownUnit {
                        sheet: self.sheet.clone(),
                        column: field.column.clone(),
                        unit: unit.clone(),
                    });
                }
                FieldKind::Enum { allowed } if allowed.is_empty() => {
                    return Err(TemplateError::EmptyEnum {
                        sheet: self.sheet.clone(),
                        column: field.column.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Sheet of the workbook this template reads.
    ///
    /// Optional sheets are only found under their own name, so a
    /// single-sheet input never supplies them.
    pub fn locate<'a>(&self, workbook: &'a Workbook) -> Option<&'a Sheet> {
        if self.required {
            workbook.sheet(&self.sheet)
        } else {
            workbook.sheet_named(&self.sheet)
        }
    }

    /// Whether a workbook carries this sheet with all required columns
    fn matches(&self, workbook: &Workbook) -> bool {
        match self.locate(workbook) {
            Some(sheet) => self.required_columns().all(|c| sheet.header().contains(c)),
            None => !self.required,
        }
    }
}

/// All sheets of one process type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessTemplate {
    /// Process type the template parses
    pub kind: ProcessKind,
    /// Human-readable summary
    #[serde(default)]
    pub description: String,
    /// Sheets in processing order
    pub sheets: Vec<SheetTemplate>,
}

impl ProcessTemplate {
    /// Sheet template by name
    pub fn sheet(&self, name: &str) -> Option<&SheetTemplate> {
        self.sheets.iter().find(|s| s.sheet.eq_ignore_ascii_case(name))
    }

    /// Check units, enums and attribute uniqueness
    pub fn validate(&self) -> Result<(), TemplateError> {
        self.sheets.iter().try_for_each(SheetTemplate::validate)
    }
}

#[derive(Serialize, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<ProcessTemplate>,
}

/// Templates of a run, one per process kind
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<ProcessTemplate>,
}

impl TemplateRegistry {
    /// Registry holding the built-in templates
    pub fn builtin() -> Self {
        Self {
            templates: builtin::all(),
        }
    }

    /// Registry with only the given templates
    pub fn new(templates: Vec<ProcessTemplate>) -> Result<Self, TemplateError> {
        let mut registry = Self {
            templates: Vec::new(),
        };
        for template in templates {
            registry.insert(template)?;
        }
        Ok(registry)
    }

    /// Add a template, replacing any template of the same kind
    pub fn insert(&mut self, template: ProcessTemplate) -> Result<(), TemplateError> {
        template.validate()?;
        debug!("Registering template for {}", template.kind);
        match self.templates.iter_mut().find(|t| t.kind == template.kind) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
        Ok(())
    }

    /// Built-in templates with the overrides of a TOML document applied
    pub fn with_toml_overrides(content: &str) -> Result<Self, TemplateError> {
        let mut registry = Self::builtin();
        let file: TemplateFile = toml::from_str(content)?;
        for template in file.templates {
            registry.insert(template)?;
        }
        Ok(registry)
    }

    /// Template for a process kind
    pub fn get(&self, kind: ProcessKind) -> Result<&ProcessTemplate, TemplateError> {
        self.templates
            .iter()
            .find(|t| t.kind == kind)
            .ok_or(TemplateError::MissingTemplate(kind))
    }

    /// Registered templates
    pub fn templates(&self) -> &[ProcessTemplate] {
        &self.templates
    }

    /// Pick the process kind whose required sheets and columns the workbook
    /// carries; kinds are tried in [`ProcessKind::ALL`] order.
    pub fn detect(&self, workbook: &Workbook) -> Option<ProcessKind> {
        ProcessKind::ALL.into_iter().find(|kind| {
            self.get(*kind)
                .map(|t| t.sheets.iter().all(|s| s.matches(workbook)))
                .unwrap_or(false)
        })
    }

    /// Serialize templates to TOML in the override format
    pub fn to_toml(templates: &[ProcessTemplate]) -> Result<String, TemplateError> {
        let file = TemplateFile {
            templates: templates.to_vec(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
