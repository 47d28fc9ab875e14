use chrono::NaiveDateTime;

use crate::model::EpicLog;

/// Seconds from `start` to `at`, millisecond resolution
pub fn process_time(start: NaiveDateTime, at: NaiveDateTime) -> f64 {
    (at - start).num_milliseconds() as f64 / 1000.0
}

/// Span of the log between its first and last timestamp
pub fn calculate_process_time(log: &mut EpicLog) {
    log.process_time = match (log.started, log.ended) {
        (Some(start), Some(end)) => Some(process_time(start, end)),
        _ => None,
    };
}
