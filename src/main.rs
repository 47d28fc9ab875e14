//! # pdi-ingest
//!
//! A command-line tool for turning lab exports into NOMAD archive entries.
//!
//! ## Supported Inputs
//!
//! - **Solution preparation** sheets (`Precursors`)
//! - **MBE growth** workbooks (`Substrate`, `Overview`, `GrowthRun`)
//! - **MBE sources** workbooks (`MBE sources`, `MBE gas mixing`)
//! - **EPIC** control-software logs (`.txt`)
//!
//! ## Usage
//!
//! ```bash
//! # Parse a workbook into archives under ./archives
//! pdi-ingest parse growth.xlsx -o archives -u upload-1
//!
//! # Check a file without writing anything
//! pdi-ingest inspect precursors.xlsx
//!
//! # Print the column templates as TOML
//! pdi-ingest templates > templates.toml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
