use std::fmt;

/// A value that cannot be turned into what the template or the record
/// requires, located by sheet, row and column
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid value in sheet '{sheet}' row {row} column '{column}': {issue}")]
pub struct ValidationError {
    /// Sheet of the offending cell
    pub sheet: String,
    /// 1-based spreadsheet row number
    pub row: usize,
    /// Column header of the offending cell
    pub column: String,
    /// What is wrong
    pub issue: ValidationIssue,
}

/// The specific problem behind a [`ValidationError`]
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Text that does not parse as a number
    NotANumber(String),
    /// Value with a fractional part, or text, in an integer column
    NotAnInteger(String),
    /// Value that is not a recognised yes/no spelling
    NotABoolean(String),
    /// Text in none of the accepted date formats
    NotADate(String),
    /// Enumerated value outside the allowed set
    UnknownVariant {
        /// Value as written
        value: String,
        /// Allowed values
        allowed: Vec<String>,
    },
    /// Inline unit symbol that is not recognised
    UnknownUnit(String),
    /// Inline unit of another dimension than the column's
    IncompatibleUnit {
        /// Unit as written
        unit: String,
        /// Unit the column is declared in
        expected: String,
    },
    /// Cell kind that cannot hold the column's type (e.g. a date in a number column)
    WrongCellType {
        /// Kind the column expects
        expected: &'static str,
        /// Kind found in the cell
        found: &'static str,
    },
    /// Blank cell where a value is needed
    MissingValue,
    /// Two different non-blank values for one record-level attribute
    Conflicting {
        /// Value seen first
        first: String,
        /// Differing value seen later
        second: String,
    },
    /// Identifier already used by an earlier record
    DuplicateIdentifier(String),
    /// References to one target use more than its whole amount
    OverAllocated {
        /// Referenced record
        target: String,
        /// Summed proportion
        proportion: f64,
    },
    /// Referenced record has no non-zero total of the used quantity
    Unscalable {
        /// Referenced record
        target: String,
        /// Quantity the reference uses (`mass` or `volume`)
        quantity: &'static str,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NotANumber(v) => write!(f, "'{}' is not a number", v),
            ValidationIssue::NotAnInteger(v) => write!(f, "'{}' is not a whole number", v),
            ValidationIssue::NotABoolean(v) => write!(f, "'{}' is not a yes/no value", v),
            ValidationIssue::NotADate(v) => write!(f, "'{}' is not a date", v),
            ValidationIssue::UnknownVariant { value, allowed } => {
                write!(f, "'{}' is not one of [{}]", value, allowed.join(", "))
            }
            ValidationIssue::UnknownUnit(u) => write!(f, "unknown unit '{}'", u),
            ValidationIssue::IncompatibleUnit { unit, expected } => {
                write!(f, "unit '{}' cannot be converted to '{}'", unit, expected)
            }
            ValidationIssue::WrongCellType { expected, found } => {
                write!(f, "expected {}, found {} cell", expected, found)
            }
            ValidationIssue::MissingValue => f.write_str("value is missing"),
            ValidationIssue::Conflicting { first, second } => {
                write!(f, "'{}' conflicts with earlier value '{}'", second, first)
            }
            ValidationIssue::DuplicateIdentifier(id) => write!(f, "identifier '{}' is used twice", id),
            ValidationIssue::OverAllocated { target, proportion } => write!(
                f,
                "references use {:.2}% of '{}'",
                proportion * 100.0,
                target
            ),
            ValidationIssue::Unscalable { target, quantity } => {
                write!(f, "'{}' has no {} total to take a share of", target, quantity)
            }
        }
    }
}
