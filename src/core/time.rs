use chrono::TimeDelta;

/// Source of monotonic time for a session.
///
/// Sample timestamps drive the estimators; a `Clock` only drives the
/// wall-clock cadence of the visualization refresh.
pub trait Clock {
    fn monotonic(&self) -> Instant;
}

/// Point in time, as the delta since the origin of the clock that produced it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct Instant(TimeDelta);

impl Default for Instant {
    fn default() -> Self {
        Instant(TimeDelta::zero())
    }
}

impl Instant {
    pub fn since_origin(&self) -> TimeDelta {
        self.0
    }

    pub fn duration_since(&self, earlier: &Instant) -> TimeDelta {
        self.0 - earlier.0
    }
}

/// Wall clock, measured from the moment the clock was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock {
            origin: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Instant {
        Instant(TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::MAX))
    }
}

/// Manually stepped clock, for replays and tests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulatedClock {
    now: Instant,
}

impl SimulatedClock {
    pub fn new(elapsed: TimeDelta) -> SimulatedClock {
        SimulatedClock {
            now: Instant(elapsed),
        }
    }

    /// Advances the clock, saturating at `TimeDelta::MAX` / `TimeDelta::MIN`.
    pub fn step(&mut self, delta: TimeDelta) {
        let saturated = if delta < TimeDelta::zero() {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        };

        self.now.0 = self.now.0.checked_add(&delta).unwrap_or(saturated);
    }
}

impl Clock for SimulatedClock {
    fn monotonic(&self) -> Instant {
        self.now
    }
}

/// Converts a duration in seconds to a `TimeDelta` with microsecond resolution.
pub fn sec_f64_to_td(sec: f64) -> TimeDelta {
    TimeDelta::microseconds((sec * 1e6).round() as i64)
}

pub fn td_to_sec_f64(td: TimeDelta) -> f64 {
    td.num_microseconds()
        .map(|us| us as f64 / 1e6)
        .unwrap_or(td.num_milliseconds() as f64 / 1e3)
}
