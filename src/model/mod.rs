//! # Record Model
//!
//! Plain record types produced by a pass. Shared behaviour is expressed
//! through capability traits rather than a type hierarchy:
//!
//! - [`Identified`]: records with an identifier (all of them)
//! - [`HasComponents`]: records made of chemical components ([`Solution`])
//! - [`HasTotals`]: records exposing calculated totals that a measured value
//!   may override ([`Solution`], [`GrowthRun`])
//!
//! All quantities are stored in canonical units (see [`crate::units`]).

mod epic;
mod growth;
mod instrument;
mod solution;
mod traits;

use serde::Serialize;

pub use epic::{EpicChannel, EpicLog, EpicSample};
pub use growth::{GrowthRun, GrowthStep, SampleStatus, SourceSetting, Substrate};
pub use instrument::{InstrumentConfiguration, MassFlowController, Port, SourceConfig, SourceType};
pub use solution::{Component, ComponentOrigin, ComponentRole, Solution, SolutionReference};
pub use traits::{HasComponents, HasTotals, Identified, ResolvedValue};

/// Any record a pass hands to a sink
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "m_def")]
pub enum Record {
    /// Precursor solution
    Solution(Solution),
    /// Growth substrate
    Substrate(Substrate),
    /// MBE growth run
    GrowthRun(GrowthRun),
    /// MBE source configuration
    Instrument(InstrumentConfiguration),
    /// EPIC control-software log
    EpicLog(EpicLog),
}

impl Record {
    /// Section name used in entry names
    pub fn section(&self) -> &'static str {
        match self {
            Record::Solution(_) => "Solution",
            Record::Substrate(_) => "Substrate",
            Record::GrowthRun(_) => "GrowthRun",
            Record::Instrument(_) => "Instrument",
            Record::EpicLog(_) => "EpicLog",
        }
    }

    /// Identified view of the record
    pub fn as_identified(&self) -> &dyn Identified {
        match self {
            Record::Solution(r) => r,
            Record::Substrate(r) => r,
            Record::GrowthRun(r) => r,
            Record::Instrument(r) => r,
            Record::EpicLog(r) => r,
        }
    }

    /// Record identifier
    pub fn id(&self) -> &str {
        self.as_identified().id()
    }

    /// Entry name, `<id>.<section>`, used as the archive file stem
    pub fn entry_name(&self) -> String {
        format!("{}.{}", self.id(), self.section())
    }
}
