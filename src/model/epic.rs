use chrono::NaiveDateTime;
use serde::Serialize;

use super::traits::Identified;

/// One logged value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpicSample {
    /// Seconds since the first timestamp of the log
    pub time: f64,
    pub value: f64,
}

/// A logged control-software channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpicChannel {
    /// Column header, e.g. `SFC_Ga.PV`
    pub name: String,
    /// Source or mass-flow controller whose loop drives the channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub samples: Vec<EpicSample>,
}

/// An EPIC control-software log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpicLog {
    /// Log name, taken from the input file
    pub id: String,
    /// `key: value` lines of the preamble
    pub preamble: Vec<(String, String)>,
    /// First timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<NaiveDateTime>,
    /// Last timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<NaiveDateTime>,
    /// Seconds between first and last timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_time: Option<f64>,
    /// Channels in column order
    pub channels: Vec<EpicChannel>,
}

impl EpicLog {
    /// Channel by column header
    pub fn channel(&self, name: &str) -> Option<&EpicChannel> {
        self.channels.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

impl Identified for EpicLog {
    fn id(&self) -> &str {
        &self.id
    }
}
