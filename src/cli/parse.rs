use anyhow::{bail, Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use pdi_ingest::emit::ArchiveWriter;
use pdi_ingest::model::{InstrumentConfiguration, Record};
use pdi_ingest::pipeline::{IngestionPass, PassOutput};
use pdi_ingest::template::{ProcessKind, TemplateRegistry};

use super::{Config, ParseArgs};

/// Upload identifier used when neither a flag nor the config names one
const DEFAULT_UPLOAD_ID: &str = "local";

/// Parse input files and write their records as archives
pub fn run(args: ParseArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let templates = config.registry()?;

    for input in &args.inputs {
        if !input.exists() {
            bail!("Input file does not exist: {}", input.display());
        }
    }

    let output = args
        .output
        .or(config.output.directory)
        .unwrap_or_else(|| PathBuf::from("."));
    let upload_id = args
        .upload_id
        .or(config.output.upload_id)
        .unwrap_or_else(|| DEFAULT_UPLOAD_ID.to_string());
    let overwrite = args.overwrite || config.output.overwrite.unwrap_or(false);

    info!("pdi-ingest - Parse lab exports");
    info!("==============================");
    info!("Inputs:    {}", args.inputs.len());
    info!("Output:    {}", output.display());
    info!("Upload ID: {}", upload_id);

    let instrument = match &args.instrument {
        Some(path) => Some(load_instrument(&templates, path)?),
        None => None,
    };
    let mut pass = IngestionPass::new(&templates);
    if let Some(instrument) = &instrument {
        pass = pass.with_instrument(instrument);
    }

    // Parse everything before writing anything.
    let kind = args.kind.map(ProcessKind::from);
    let mut outputs: Vec<PassOutput> = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let parsed = pass
            .run_file(input, kind)
            .with_context(|| format!("Failed to parse {}", input.display()))?;
        info!(
            "  {}: {} ({} records)",
            input.display(),
            parsed.kind,
            parsed.records.len()
        );
        outputs.push(parsed);
    }
    let records: Vec<Record> = outputs.into_iter().flat_map(|o| o.records).collect();

    if args.dry_run {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to serialize records")?
        );
        return Ok(());
    }

    let mut sink = ArchiveWriter::new(&output, upload_id).with_overwrite(overwrite);
    let entries = IngestionPass::emit(&records, &mut sink).context("Failed to write archives")?;

    info!("Parsing complete!");
    for entry in &entries {
        println!("{}\t{}", entry.file_name, entry.reference);
    }

    Ok(())
}

/// Parse an MBE sources workbook into its instrument configuration
fn load_instrument(templates: &TemplateRegistry, path: &Path) -> Result<InstrumentConfiguration> {
    let output = IngestionPass::new(templates)
        .run_file(path, Some(ProcessKind::MbeSources))
        .with_context(|| format!("Failed to parse instrument file {}", path.display()))?;

    output
        .records
        .into_iter()
        .find_map(|record| match record {
            Record::Instrument(config) => Some(config),
            _ => None,
        })
        .with_context(|| format!("No instrument configuration in {}", path.display()))
}
