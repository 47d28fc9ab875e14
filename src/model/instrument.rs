use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use super::traits::Identified;

/// Kind of MBE source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceType {
    /// Plasma source
    Plasma,
    /// Single-filament effusion cell
    SingleFilamentCell,
    /// Double-filament effusion cell
    DoubleFilamentCell,
    /// Any other source
    Other,
    /// Port without a source
    None,
}

impl SourceType {
    /// Parse the sheet code (`PLASMA`, `SFC`, `DFC`, `other`, `none`)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "PLASMA" => Some(SourceType::Plasma),
            "SFC" => Some(SourceType::SingleFilamentCell),
            "DFC" => Some(SourceType::DoubleFilamentCell),
            "OTHER" => Some(SourceType::Other),
            "NONE" => Some(SourceType::None),
            _ => None,
        }
    }

    /// Sheet code
    pub fn code(&self) -> &'static str {
        match self {
            SourceType::Plasma => "PLASMA",
            SourceType::SingleFilamentCell => "SFC",
            SourceType::DoubleFilamentCell => "DFC",
            SourceType::Other => "other",
            SourceType::None => "none",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A flange port of the growth chamber; lengths in m, angles in degree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub port_number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flange_diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flange_to_substrate_distance: Option<f64>,
}

/// A source mounted on the instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceConfig {
    /// Source identifier; the EPIC loop when no ID is given
    pub id: String,
    pub source_type: SourceType,
    /// Control-software loop name
    pub epic_loop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_flux_species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_flux_species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crucible: Option<String>,
    /// Source length in m
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
}

impl Identified for SourceConfig {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A mass-flow controller of the gas mixing system
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassFlowController {
    pub id: String,
    /// Control-software loop name
    pub epic_loop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    /// Maximum flow in ml/min
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_flow: Option<f64>,
}

/// Source and gas configuration of an MBE instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentConfiguration {
    /// Configuration name, taken from the input file
    pub id: String,
    /// Ports referenced by sources, in first-seen order
    pub ports: Vec<Port>,
    pub sources: Vec<SourceConfig>,
    pub mass_flow_controllers: Vec<MassFlowController>,
}

impl InstrumentConfiguration {
    /// Source or mass-flow controller whose EPIC loop drives `channel`.
    ///
    /// A channel belongs to a loop when it is named after the loop or
    /// starts with `<loop>.` (e.g. `SFC_Ga.PV`). Returns the ID of the match.
    pub fn loop_owner(&self, channel: &str) -> Option<&str> {
        let belongs = |epic_loop: &str| {
            channel.eq_ignore_ascii_case(epic_loop)
                || channel
                    .get(..epic_loop.len() + 1)
                    .is_some_and(|p| p.eq_ignore_ascii_case(&format!("{}.", epic_loop)))
        };
        self.sources
            .iter()
            .find(|s| belongs(&s.epic_loop))
            .map(|s| s.id.as_str())
            .or_else(|| {
                self.mass_flow_controllers
                    .iter()
                    .find(|m| belongs(&m.epic_loop))
                    .map(|m| m.id.as_str())
            })
    }
}

impl Identified for InstrumentConfiguration {
    fn id(&self) -> &str {
        &self.id
    }
}
