//! Offline replay of CSV accelerometer recordings.
//!
//! Rows are `x,y,z,timestamp` with a header line. The session runs on a
//! [`SimulatedClock`] advanced by the recording's timestamps, so the
//! visualization cadence follows recording time and not replay speed.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use chrono::TimeDelta;
use log::warn;

use crate::{
    core::time::SimulatedClock,
    datatypes::AccelSample,
    estimation::EstimatorParams,
    session::{MotionSession, SessionState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Write one estimate every `every` accepted samples. Zero counts as one.
    pub every: u64,
    /// Also write the plot geometry whenever a visualization refresh is due.
    pub frames: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        ReplayOptions {
            every: 1,
            frames: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub accepted: u64,
    /// Out of order or duplicate rows. The first row of a recording only
    /// starts tracking and is not counted.
    pub dropped: u64,
    /// Rows with a non-finite component.
    pub rejected: u64,
}

/// Feeds every row of `source` through a fresh session and writes the
/// estimates to `sink` as JSON lines.
///
/// A row that cannot be parsed aborts the replay.
pub fn replay<R: Read, W: Write>(
    source: R,
    mut sink: W,
    params: EstimatorParams,
    options: &ReplayOptions,
) -> Result<ReplayStats> {
    let every = options.every.max(1);

    let mut reader = csv::Reader::from_reader(source);
    let mut session = MotionSession::with_clock(params, SimulatedClock::default())?;
    let mut clock_ms: Option<i64> = None;

    let mut stats = ReplayStats::default();

    for (row, record) in reader.deserialize::<AccelSample>().enumerate() {
        let sample = record.with_context(|| format!("Malformed sample on row {}", row + 1))?;

        advance_clock(session.clock_mut(), &mut clock_ms, sample.timestamp_ms);

        let initial = session.state() == SessionState::Uninitialized;

        match session.ingest(&sample) {
            Ok(Some(snapshot)) => {
                stats.accepted += 1;

                if stats.accepted % every == 0 {
                    writeln!(sink, "{}", serde_json::to_string(&snapshot)?)?;
                }

                if options.frames && snapshot.due_for_visualization {
                    if let Some(frame) = session.visualization_frame() {
                        writeln!(sink, "{}", serde_json::to_string(&frame)?)?;
                    }
                }
            }
            Ok(None) if initial => {}
            Ok(None) => stats.dropped += 1,
            Err(err) => {
                warn!("Row {}: {err}", row + 1);
                stats.rejected += 1;
            }
        }
    }

    sink.flush()?;

    Ok(stats)
}

/// Moves the clock forward to `timestamp_ms`. Older timestamps leave it alone.
fn advance_clock(clock: &mut SimulatedClock, clock_ms: &mut Option<i64>, timestamp_ms: i64) {
    let last_ms = *clock_ms.get_or_insert(timestamp_ms);
    if timestamp_ms <= last_ms {
        return;
    }

    let step = i64::try_from(timestamp_ms.abs_diff(last_ms))
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX);

    clock.step(step);
    *clock_ms = Some(timestamp_ms);
}
