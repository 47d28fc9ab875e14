use chrono::NaiveDateTime;
use serde::Serialize;

use super::traits::{HasTotals, Identified, ResolvedValue};

/// Processing state of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleStatus {
    /// Same condition as delivered
    pub as_delivered: bool,
    /// Not used yet
    pub fresh: bool,
    /// Underwent processing such as etching or annealing
    pub processed: bool,
    /// Underwent vapor deposition
    pub grown: bool,
}

impl Default for SampleStatus {
    fn default() -> Self {
        Self {
            as_delivered: true,
            fresh: true,
            processed: false,
            grown: false,
        }
    }
}

impl SampleStatus {
    /// Status after a growth run used the sample
    pub fn mark_grown(&mut self) {
        self.as_delivered = false;
        self.fresh = false;
        self.grown = true;
    }
}

/// A wafer or substrate piece used in growth runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substrate {
    /// Substrate identifier
    pub id: String,
    /// Crystal orientation, e.g. `(100)`
    pub orientation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crystal_id: Option<String>,
    /// Miscut angle in degree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miscut: Option<f64>,
    /// Diameter in m
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epi_ready: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Processing state
    pub status: SampleStatus,
}

impl Identified for Substrate {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Setting of one MBE source during a growth step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSetting {
    /// 0-based column block the setting was read from
    pub block: usize,
    /// Source name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Temperature in K
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Power in W
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
}

/// One step of a growth run; temperatures in K, pressure in Pa, flows in ml/min
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthStep {
    /// Step position as written in the sheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Duration in s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub flow_metal_carrier: f64,
    pub flow_oxidant_carrier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substrate_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shaft_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filament_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Source settings, one per non-blank column block
    pub sources: Vec<SourceSetting>,
}

/// An MBE growth run from the `Overview` sheet with its steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRun {
    /// Growth run name
    pub id: String,
    /// Sample grown in the run
    pub sample_id: String,
    /// Substrate the sample was grown on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substrate: Option<String>,
    pub method: String,
    /// Substrate temperature in K
    pub substrate_temperature: f64,
    /// VI/III flux ratio
    pub vi_iii_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<NaiveDateTime>,
    /// Duration in s; the overview value overrides the sum of steps
    pub duration: ResolvedValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub susceptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pocket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps in step-index order, file order when unnumbered
    pub steps: Vec<GrowthStep>,
}

impl Identified for GrowthRun {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasTotals for GrowthRun {
    fn totals(&self) -> Vec<(&'static str, &ResolvedValue)> {
        vec![("duration", &self.duration)]
    }
}
