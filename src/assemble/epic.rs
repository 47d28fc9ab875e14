use log::{debug, warn};

use crate::derive::epic as calc;
use crate::mapping::{TypedRow, TypedValue, ValidationError, ValidationIssue};
use crate::model::{EpicChannel, EpicLog, EpicSample, InstrumentConfiguration};
use crate::template::builtin::epic::TIMESTAMP;

/// Build an EPIC log from its mapped rows.
///
/// Every passthrough column becomes a channel. Sample times are seconds
/// since the first row. With an instrument configuration, channels are
/// linked to the source or controller owning their loop.
pub fn assemble_epic(
    id: &str,
    preamble: &[(String, String)],
    rows: &[TypedRow],
    instrument: Option<&InstrumentConfiguration>,
) -> Result<EpicLog, ValidationError> {
    let mut log = EpicLog {
        id: id.to_string(),
        preamble: preamble.to_vec(),
        started: None,
        ended: None,
        process_time: None,
        channels: Vec::new(),
    };

    for row in rows {
        let at = row
            .datetime(TIMESTAMP)
            .ok_or_else(|| row.error(TIMESTAMP, ValidationIssue::MissingValue))?;
        let start = *log.started.get_or_insert(at);
        log.ended = Some(at);
        let time = calc::process_time(start, at);

        for (name, value) in row.extras() {
            let value = match value {
                TypedValue::Number(v) => *v,
                TypedValue::Integer(v) => *v as f64,
                _ => continue,
            };
            let channel = match log.channels.iter().position(|c| &c.name == name) {
                Some(i) => &mut log.channels[i],
                None => {
                    log.channels.push(EpicChannel {
                        name: name.clone(),
                        source: None,
                        samples: Vec::new(),
                    });
                    let last = log.channels.len() - 1;
                    &mut log.channels[last]
                }
            };
            channel.samples.push(EpicSample { time, value });
        }
    }

    if let Some(instrument) = instrument {
        for channel in &mut log.channels {
            channel.source = instrument.loop_owner(&channel.name).map(str::to_string);
            if channel.source.is_none() {
                warn!(
                    "EPIC channel '{}' has no configured source in '{}'",
                    channel.name, instrument.id
                );
            }
        }
    }

    calc::calculate_process_time(&mut log);
    debug!(
        "Assembled EPIC log '{}': {} channel(s), {} row(s)",
        log.id,
        log.channels.len(),
        rows.len()
    );
    Ok(log)
}
