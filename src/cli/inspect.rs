use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use pdi_ingest::ingest::Workbook;
use pdi_ingest::report::InspectionReport;
use pdi_ingest::template::ProcessKind;

use super::Config;

/// Check an input file against the templates
pub fn run(input: PathBuf, kind: Option<ProcessKind>, config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let templates = config.registry()?;

    info!("pdi-ingest Inspector");
    info!("====================");
    info!("File: {}", input.display());
    info!("");

    let workbook =
        Workbook::open(&input).with_context(|| format!("Failed to open {}", input.display()))?;
    let name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let report = InspectionReport::inspect(&workbook, &templates, kind, &name);

    // Use colorized output if available
    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    // Exit with error code if inspection failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
