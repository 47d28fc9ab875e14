use super::ProcessKind;

/// Errors in template definitions
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// TOML deserialization error
    #[error("Failed to parse template TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize template TOML: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// A number field declares a unit symbol that is not recognised
    #[error("Unknown unit '{unit}' for column '{column}' in sheet '{sheet}'")]
    UnknownUnit {
        /// Sheet of the field
        sheet: String,
        /// Column of the field
        column: String,
        /// Offending unit symbol
        unit: String,
    },

    /// An enumerated field has no allowed values
    #[error("Enumerated column '{column}' in sheet '{sheet}' allows no values")]
    EmptyEnum {
        /// Sheet of the field
        sheet: String,
        /// Column of the field
        column: String,
    },

    /// Two fields of one sheet map to the same attribute
    #[error("Attribute '{attribute}' is mapped twice in sheet '{sheet}'")]
    DuplicateAttribute {
        /// Sheet of the fields
        sheet: String,
        /// Attribute name
        attribute: String,
    },

    /// A template required by the pipeline is not registered
    #[error("No template registered for {0}")]
    MissingTemplate(ProcessKind),

    /// A process template lacks a sheet the assembler reads
    #[error("Template for {kind} has no sheet '{sheet}'")]
    MissingSheetTemplate {
        /// Process kind of the template
        kind: ProcessKind,
        /// Sheet that was looked up
        sheet: String,
    },
}
