use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use super::error::ValidationIssue;
use crate::ingest::{format_number, CellValue};
use crate::template::{DefaultValue, FieldKind};
use crate::units::{split_value_and_unit, Unit};

/// Accepted text layouts for date/time cells, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// A cell value coerced to its column's type; numbers are in canonical units
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Text, identifiers and enum values (canonical spelling)
    Text(String),
    /// Quantity in the canonical unit of its dimension
    Number(f64),
    /// Whole number
    Integer(i64),
    /// Flag
    Bool(bool),
    /// Timestamp
    DateTime(NaiveDateTime),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Text(s) => f.write_str(s),
            TypedValue::Number(n) => f.write_str(&format_number(*n)),
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Column type with its unit resolved once per sheet
#[derive(Debug, Clone)]
pub(crate) enum Coercion {
    Text,
    Number(Option<Unit>),
    Integer,
    Bool,
    Enum(Vec<String>),
    DateTime,
}

impl Coercion {
    pub(crate) fn for_kind(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Text => Coercion::Text,
            FieldKind::Number { unit } => Coercion::Number(unit.as_deref().and_then(Unit::parse)),
            FieldKind::Integer => Coercion::Integer,
            FieldKind::Bool => Coercion::Bool,
            FieldKind::Enum { allowed } => Coercion::Enum(allowed.clone()),
            FieldKind::DateTime => Coercion::DateTime,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Coercion::Text => "text",
            Coercion::Number(_) => "number",
            Coercion::Integer => "whole number",
            Coercion::Bool => "yes/no value",
            Coercion::Enum(_) => "enumerated value",
            Coercion::DateTime => "date",
        }
    }

    /// Coerce a non-blank cell
    pub(crate) fn apply(&self, cell: &CellValue) -> Result<TypedValue, ValidationIssue> {
        let wrong_type = || ValidationIssue::WrongCellType {
            expected: self.expected(),
            found: cell.kind_name(),
        };

        match self {
            Coercion::Text => Ok(TypedValue::Text(cell.to_string())),
            Coercion::Number(unit) => match cell {
                CellValue::Number(n) => Ok(TypedValue::Number(to_canonical(*unit, *n))),
                CellValue::Text(text) => parse_quantity(text, *unit).map(TypedValue::Number),
                _ => Err(wrong_type()),
            },
            Coercion::Integer => match cell {
                CellValue::Number(n) if n.fract() == 0.0 => Ok(TypedValue::Integer(*n as i64)),
                CellValue::Number(n) => Err(ValidationIssue::NotAnInteger(format_number(*n))),
                CellValue::Text(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(TypedValue::Integer)
                    .map_err(|_| ValidationIssue::NotAnInteger(text.clone())),
                _ => Err(wrong_type()),
            },
            Coercion::Bool => match cell {
                CellValue::Bool(b) => Ok(TypedValue::Bool(*b)),
                CellValue::Number(n) if *n == 1.0 => Ok(TypedValue::Bool(true)),
                CellValue::Number(n) if *n == 0.0 => Ok(TypedValue::Bool(false)),
                CellValue::Text(text) => parse_bool(text)
                    .map(TypedValue::Bool)
                    .ok_or_else(|| ValidationIssue::NotABoolean(text.clone())),
                CellValue::Number(n) => Err(ValidationIssue::NotABoolean(format_number(*n))),
                _ => Err(wrong_type()),
            },
            Coercion::Enum(allowed) => {
                let value = match cell {
                    CellValue::Text(_) | CellValue::Number(_) => cell.to_string(),
                    _ => return Err(wrong_type()),
                };
                allowed
                    .iter()
                    .find(|a| a.eq_ignore_ascii_case(value.trim()))
                    .map(|a| TypedValue::Text(a.clone()))
                    .ok_or_else(|| ValidationIssue::UnknownVariant {
                        value,
                        allowed: allowed.clone(),
                    })
            }
            Coercion::DateTime => match cell {
                CellValue::DateTime(dt) => Ok(TypedValue::DateTime(*dt)),
                CellValue::Text(text) => parse_datetime(text)
                    .map(TypedValue::DateTime)
                    .ok_or_else(|| ValidationIssue::NotADate(text.clone())),
                _ => Err(wrong_type()),
            },
        }
    }

    /// Typed form of a template default
    pub(crate) fn default_value(&self, default: &DefaultValue) -> Result<TypedValue, ValidationIssue> {
        let cell = match default {
            DefaultValue::Bool(b) => CellValue::Bool(*b),
            DefaultValue::Number(n) => CellValue::Number(*n),
            DefaultValue::Text(s) => CellValue::from_text(s),
        };
        if cell.is_blank() {
            return Err(ValidationIssue::MissingValue);
        }
        self.apply(&cell)
    }
}

fn to_canonical(unit: Option<Unit>, value: f64) -> f64 {
    unit.map_or(value, |u| u.to_canonical(value))
}

/// Parse `"5"` or `"5 mg"`; an inline unit must measure the declared dimension
fn parse_quantity(text: &str, declared: Option<Unit>) -> Result<f64, ValidationIssue> {
    let (value, inline) =
        split_value_and_unit(text).ok_or_else(|| ValidationIssue::NotANumber(text.to_string()))?;

    let Some(symbol) = inline else {
        return Ok(to_canonical(declared, value));
    };
    let unit = Unit::parse(symbol).ok_or_else(|| ValidationIssue::UnknownUnit(symbol.to_string()))?;
    match declared {
        Some(expected) if expected.dimension != unit.dimension => Err(ValidationIssue::IncompatibleUnit {
            unit: symbol.to_string(),
            expected: expected.symbol.to_string(),
        }),
        _ => Ok(unit.to_canonical(value)),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "x" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Parse one of the accepted date/time layouts; date-only text is midnight
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
