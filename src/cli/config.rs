//! TOML configuration file support.
//!
//! Output settings and template overrides can live in a config file instead
//! of being passed as flags; flags win over config values:
//!
//! ```toml
//! # pdi-ingest.toml
//! [output]
//! directory = "archives"
//! upload_id = "upload-2024-05"
//! overwrite = false
//!
//! [[templates]]
//! kind = "mbe_sources"
//! # ... same layout as `pdi-ingest templates` prints
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use pdi_ingest::template::{ProcessTemplate, TemplateRegistry};

/// Root configuration structure for pdi-ingest.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Archive output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Templates replacing the built-in template of their kind.
    #[serde(default)]
    pub templates: Vec<ProcessTemplate>,
}

/// Configuration for the parse command.
#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory archive files are written to.
    pub directory: Option<PathBuf>,

    /// Upload identifier used in entry references.
    pub upload_id: Option<String>,

    /// Replace existing archives whose content differs.
    pub overwrite: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the config file if one was given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Built-in templates with this config's overrides applied.
    pub fn registry(&self) -> Result<TemplateRegistry> {
        let mut registry = TemplateRegistry::builtin();
        for template in &self.templates {
            registry
                .insert(template.clone())
                .with_context(|| format!("Invalid template override for {}", template.kind))?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdi_ingest::template::ProcessKind;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [output]
            directory = "archives"
            upload_id = "upload-1"
            overwrite = true
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.output.directory, Some(PathBuf::from("archives")));
        assert_eq!(config.output.upload_id.as_deref(), Some("upload-1"));
        assert_eq!(config.output.overwrite, Some(true));
        assert!(config.templates.is_empty());
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [output]
            upload_id = "upload-1"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.output.upload_id.as_deref(), Some("upload-1"));
        assert_eq!(config.output.directory, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.output.overwrite, None);
        assert_eq!(config.registry().unwrap().templates().len(), 4);
    }

    #[test]
    fn test_template_override() {
        let toml = r#"
            [[templates]]
            kind = "solution_preparation"

            [[templates.sheets]]
            sheet = "Precursors"

            [[templates.sheets.fields]]
            column = "Sample"
            attribute = "solution_id"
            kind = { type = "text" }
            required = true

            [[templates.sheets.fields]]
            column = "Chemical"
            attribute = "component"
            kind = { type = "text" }
            required = true
        "#;

        let config = Config::from_str(toml).unwrap();
        let registry = config.registry().unwrap();
        let template = registry.get(ProcessKind::SolutionPreparation).unwrap();
        assert_eq!(template.sheets[0].fields[0].column, "Sample");
        assert!(registry.get(ProcessKind::MbeGrowth).is_ok());
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let toml = r#"
            [[templates]]
            kind = "solution_preparation"

            [[templates.sheets]]
            sheet = "Precursors"

            [[templates.sheets.fields]]
            column = "Mass"
            attribute = "mass"
            kind = { type = "number", unit = "furlong" }
        "#;

        let config = Config::from_str(toml).unwrap();
        assert!(config.registry().is_err());
    }
}
