//! # Field Mapper
//!
//! Turns loosely typed [`RowRecord`]s into [`TypedRow`]s following a
//! [`SheetTemplate`]: every field is coerced to its declared kind, numbers are
//! converted to canonical units and blank cells take the template default or
//! stay unset.
//!
//! A [`FieldMapper`] is built once per sheet; it resolves column positions and
//! units up front so that mapping a row is a plain walk over the cells.

mod error;
mod value;


use chrono::NaiveDateTime;
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ingest::{FormatError, Header, RowRecord};
use crate::template::{FieldKind, FieldSpec, SheetTemplate};
use value::Coercion;

pub use error::{ValidationError, ValidationIssue};
pub use value::{parse_datetime, TypedValue};

/// Typed attribute values keyed by attribute name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: HashMap<String, TypedValue>,
    columns: HashMap<String, String>,
}

impl Attributes {
    fn insert(&mut self, attribute: &str, column: &str, value: Option<TypedValue>) {
        self.columns.insert(attribute.to_string(), column.to_string());
        if let Some(value) = value {
            self.values.insert(attribute.to_string(), value);
        }
    }

    /// Raw typed value
    pub fn get(&self, attribute: &str) -> Option<&TypedValue> {
        self.values.get(attribute)
    }

    /// Whether the attribute has a value
    pub fn is_set(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    /// Text attribute (also enum values)
    pub fn text(&self, attribute: &str) -> Option<&str> {
        match self.values.get(attribute) {
            Some(TypedValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric attribute in canonical units
    pub fn number(&self, attribute: &str) -> Option<f64> {
        match self.values.get(attribute) {
            Some(TypedValue::Number(n)) => Some(*n),
            Some(TypedValue::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Whole-number attribute
    pub fn integer(&self, attribute: &str) -> Option<i64> {
        match self.values.get(attribute) {
            Some(TypedValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Boolean attribute
    pub fn flag(&self, attribute: &str) -> Option<bool> {
        match self.values.get(attribute) {
            Some(TypedValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Date/time attribute
    pub fn datetime(&self, attribute: &str) -> Option<NaiveDateTime> {
        match self.values.get(attribute) {
            Some(TypedValue::DateTime(dt)) => Some(*dt),
            _ => None,
        }
    }

    /// Column the attribute was read from; the attribute name when the
    /// template does not map it
    pub fn column<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.columns.get(attribute).map_or(attribute, String::as_str)
    }
}

/// One repeated column block of a row
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBlock {
    /// 0-based block index
    pub index: usize,
    /// Block values, keyed by attribute
    pub values: Attributes,
}

/// A row with every template field coerced to its type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    sheet: Arc<str>,
    row: usize,
    values: Attributes,
    blocks: Vec<TypedBlock>,
    extras: Vec<(String, TypedValue)>,
}

impl TypedRow {
    /// Sheet the row came from
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// 1-based spreadsheet row number
    pub fn row(&self) -> usize {
        self.row
    }

    /// Field values
    pub fn values(&self) -> &Attributes {
        &self.values
    }

    /// Text field
    pub fn text(&self, attribute: &str) -> Option<&str> {
        self.values.text(attribute)
    }

    /// Numeric field in canonical units
    pub fn number(&self, attribute: &str) -> Option<f64> {
        self.values.number(attribute)
    }

    /// Date/time field
    pub fn datetime(&self, attribute: &str) -> Option<NaiveDateTime> {
        self.values.datetime(attribute)
    }

    /// Whether a field has a value
    pub fn is_set(&self, attribute: &str) -> bool {
        self.values.is_set(attribute)
    }

    /// Repeated column blocks that hold at least one value
    pub fn blocks(&self) -> &[TypedBlock] {
        &self.blocks
    }

    /// Non-blank passthrough columns in sheet order, keyed by header
    pub fn extras(&self) -> &[(String, TypedValue)] {
        &self.extras
    }

    /// Validation error located at this row and the attribute's column
    pub fn error(&self, attribute: &str, issue: ValidationIssue) -> ValidationError {
        ValidationError {
            sheet: self.sheet.to_string(),
            row: self.row,
            column: self.values.column(attribute).to_string(),
            issue,
        }
    }

    /// Text field that must not be blank
    pub fn require_text(&self, attribute: &str) -> Result<&str, ValidationError> {
        self.text(attribute)
            .ok_or_else(|| self.error(attribute, ValidationIssue::MissingValue))
    }

    /// Numeric field that must not be blank
    pub fn require_number(&self, attribute: &str) -> Result<f64, ValidationError> {
        self.number(attribute)
            .ok_or_else(|| self.error(attribute, ValidationIssue::MissingValue))
    }
}

#[derive(Debug, Clone)]
struct BoundField {
    column: String,
    attribute: String,
    position: Option<usize>,
    coercion: Coercion,
    default: Option<TypedValue>,
}

impl BoundField {
    fn bind(spec: &FieldSpec, column: String, header: &Header, sheet: &str) -> Self {
        let coercion = Coercion::for_kind(&spec.kind);
        if let (FieldKind::Number { unit: Some(unit) }, Coercion::Number(None)) = (&spec.kind, &coercion) {
            warn!(
                "Sheet '{}': unknown unit '{}' for column '{}', values are kept unconverted",
                sheet, unit, spec.column
            );
        }
        // A default that does not fit its own column is dropped.
        let default = spec.default.as_ref().and_then(|d| match coercion.default_value(d) {
            Ok(value) => Some(value),
            Err(issue) => {
                warn!("Sheet '{}': ignoring default of column '{}': {}", sheet, spec.column, issue);
                None
            }
        });

        Self {
            position: header.position(&column),
            column,
            attribute: spec.attribute.clone(),
            coercion,
            default,
        }
    }

    fn read(&self, row: &RowRecord) -> Result<Option<TypedValue>, ValidationError> {
        let cell = match self.position {
            Some(position) => row.get_index(position),
            None => return Ok(self.default.clone()),
        };
        if cell.is_blank() {
            return Ok(self.default.clone());
        }
        self.coercion
            .apply(cell)
            .map(Some)
            .map_err(|issue| ValidationError {
                sheet: row.sheet().to_string(),
                row: row.row(),
                column: self.column.clone(),
                issue,
            })
    }
}

/// Maps the rows of one sheet through a [`SheetTemplate`]
#[derive(Debug, Clone)]
pub struct FieldMapper {
    fields: Vec<BoundField>,
    blocks: Vec<Vec<BoundField>>,
    passthrough: Option<(Coercion, Vec<(usize, String)>)>,
    ignored: Vec<String>,
}

impl FieldMapper {
    /// Bind a template to a sheet header.
    ///
    /// Fails with `FormatError::MissingColumn` when a required column is
    /// absent. Block columns must already carry their `.N` suffixes
    /// (see [`crate::ingest::Sheet::rename_blocks`]).
    pub fn new(template: &SheetTemplate, sheet: &str, header: &Header) -> Result<Self, FormatError> {
        for column in template.required_columns() {
            if !header.contains(column) {
                return Err(FormatError::MissingColumn {
                    sheet: sheet.to_string(),
                    column: column.to_string(),
                });
            }
        }

        let fields = template
            .fields
            .iter()
            .map(|spec| BoundField::bind(spec, spec.column.clone(), header, sheet))
            .collect::<Vec<_>>();

        let mut blocks = Vec::new();
        if let Some(block) = &template.block {
            let mut index = 0;
            while header.contains(&format!("{}.{}", block.initial, index)) {
                let bound: Vec<BoundField> = block
                    .fields
                    .iter()
                    .map(|spec| {
                        BoundField::bind(spec, format!("{}.{}", spec.column, index), header, sheet)
                    })
                    .collect();
                blocks.push(bound);
                index += 1;
            }
        }

        let claimed: Vec<usize> = fields
            .iter()
            .chain(blocks.iter().flatten())
            .filter_map(|f| f.position)
            .collect();
        let unclaimed: Vec<(usize, String)> = header
            .names()
            .iter()
            .enumerate()
            .filter(|(i, name)| !claimed.contains(i) && !name.trim().is_empty())
            .map(|(i, name)| (i, name.clone()))
            .collect();

        let (passthrough, ignored) = match &template.passthrough {
            Some(kind) => (Some((Coercion::for_kind(kind), unclaimed)), Vec::new()),
            None => (None, unclaimed.into_iter().map(|(_, name)| name).collect()),
        };

        Ok(Self {
            fields,
            blocks,
            passthrough,
            ignored,
        })
    }

    /// Headers that no field claims and that are not passed through
    pub fn ignored_columns(&self) -> &[String] {
        &self.ignored
    }

    /// Number of repeated column blocks found in the header
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Headers of the passthrough columns in sheet order
    pub fn passthrough_columns(&self) -> Vec<&str> {
        self.passthrough
            .iter()
            .flat_map(|(_, columns)| columns.iter().map(|(_, name)| name.as_str()))
            .collect()
    }

    /// Coerce one row
    pub fn map(&self, row: &RowRecord) -> Result<TypedRow, ValidationError> {
        let mut values = Attributes::default();
        for field in &self.fields {
            values.insert(&field.attribute, &field.column, field.read(row)?);
        }

        let mut blocks = Vec::new();
        for (index, fields) in self.blocks.iter().enumerate() {
            let mut block = Attributes::default();
            for field in fields {
                block.insert(&field.attribute, &field.column, field.read(row)?);
            }
            if !block.values.is_empty() {
                blocks.push(TypedBlock {
                    index,
                    values: block,
                });
            }
        }

        let mut extras = Vec::new();
        if let Some((coercion, columns)) = &self.passthrough {
            for (position, name) in columns {
                let cell = row.get_index(*position);
                if cell.is_blank() {
                    continue;
                }
                let value = coercion.apply(cell).map_err(|issue| ValidationError {
                    sheet: row.sheet().to_string(),
                    row: row.row(),
                    column: name.clone(),
                    issue,
                })?;
                extras.push((name.clone(), value));
            }
        }

        Ok(TypedRow {
            sheet: Arc::from(row.sheet()),
            row: row.row(),
            values,
            blocks,
            extras,
        })
    }
}
