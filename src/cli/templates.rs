use anyhow::{Context, Result};
use std::path::PathBuf;

use pdi_ingest::template::{ProcessKind, TemplateRegistry};

use super::Config;

/// Print the active templates in the override format
pub fn run(kind: Option<ProcessKind>, config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let registry = config.registry()?;

    let templates = match kind {
        Some(kind) => vec![registry.get(kind)?.clone()],
        None => registry.templates().to_vec(),
    };
    let text = TemplateRegistry::to_toml(&templates).context("Failed to render templates")?;
    print!("{}", text);

    Ok(())
}
