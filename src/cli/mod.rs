use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pdi_ingest::template::ProcessKind;

mod inspect;
mod parse;
mod templates;

mod config;

pub use config::Config;

/// pdi-ingest - Parse lab exports into NOMAD archive records
#[derive(Parser)]
#[command(name = "pdi-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Process type of an input file.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    /// Precursor solution preparation sheet
    Solution,
    /// MBE growth workbook (Substrate, Overview, GrowthRun)
    Growth,
    /// MBE source and gas configuration workbook
    Sources,
    /// EPIC control-software log
    Epic,
}

impl From<KindArg> for ProcessKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Solution => ProcessKind::SolutionPreparation,
            KindArg::Growth => ProcessKind::MbeGrowth,
            KindArg::Sources => ProcessKind::MbeSources,
            KindArg::Epic => ProcessKind::EpicLog,
        }
    }
}

/// Arguments of the `parse` command
#[derive(Args)]
pub struct ParseArgs {
    /// Input files (.xlsx, .xls, .ods, .csv, .tsv, EPIC .txt)
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Process type (detected from sheets and columns when omitted)
    #[arg(short = 'k', long, value_enum)]
    kind: Option<KindArg>,

    /// Output directory for archive files
    #[arg(short = 'o', long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Upload identifier used for entry references
    #[arg(short = 'u', long)]
    upload_id: Option<String>,

    /// Replace existing archives whose content differs
    #[arg(long)]
    overwrite: bool,

    /// MBE sources workbook used to link EPIC log channels
    #[arg(long, value_name = "FILE")]
    instrument: Option<PathBuf>,

    /// Print records as JSON instead of writing archives
    #[arg(long)]
    dry_run: bool,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse input files and write one archive per record
    Parse(ParseArgs),

    /// Check an input file against the templates without writing anything
    Inspect {
        /// Input file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Process type (detected when omitted)
        #[arg(short = 'k', long, value_enum)]
        kind: Option<KindArg>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the active column templates as TOML
    Templates {
        /// Only print the template of this process type
        #[arg(short = 'k', long, value_enum)]
        kind: Option<KindArg>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse(args) => parse::run(args),
        Commands::Inspect {
            input,
            kind,
            config,
        } => inspect::run(input, kind.map(ProcessKind::from), config),
        Commands::Templates { kind, config } => templates::run(kind.map(ProcessKind::from), config),
    }
}
