//! Common types used in stabilization detection

use std::fmt;
use std::time::{Duration, Instant};

/// What the driver should do after an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Keep driving the feed; wait roughly `delay_ms` before the next poll
    Continue { delay_ms: u64 },

    /// The feed stopped growing
    Stop,
}

impl Decision {
    pub fn is_continue(&self) -> bool {
        matches!(self, Decision::Continue { .. })
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Decision::Stop)
    }

    /// Advisory delay before the next poll, if the session continues
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Decision::Continue { delay_ms } => Some(Duration::from_millis(*delay_ms)),
            Decision::Stop => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Continue { delay_ms } => write!(f, "Continue (next poll in {delay_ms} ms)"),
            Decision::Stop => write!(f, "Stop"),
        }
    }
}

/// Detector lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorStatus {
    /// Still watching for growth
    Active,

    /// Patience exhausted; terminal until reset
    Stopped,
}

impl fmt::Display for DetectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorStatus::Active => write!(f, "Active"),
            DetectorStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Classification of a single observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// Size grew by more than the noise threshold
    Progress,

    /// No meaningful growth; patience not yet exhausted
    Stagnant,

    /// No meaningful growth and patience ran out on this tick
    Exhausted,

    /// Observation arrived after the detector stopped
    Ignored,
}

/// Snapshot of the detector's internal counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorState {
    /// Size at the last progress tick (or the seeded baseline)
    pub last_size: u64,

    /// Consecutive stagnant ticks since the last progress
    pub stagnant_count: usize,

    /// Observations accepted in this session
    pub total_ticks: usize,

    /// Patience limit that applies to the next observation
    pub patience_limit: usize,

    /// Whether the detector still accepts observations
    pub active: bool,

    /// Timestamp of the first observation of the session
    pub session_started: Option<Instant>,

    /// Latest accepted (monotonic) timestamp
    pub last_timestamp: Option<Instant>,

    /// Timestamp of the last progress tick
    pub last_progress_at: Option<Instant>,
}

impl DetectorState {
    pub fn status(&self) -> DetectorStatus {
        if self.active {
            DetectorStatus::Active
        } else {
            DetectorStatus::Stopped
        }
    }

    /// Time covered by the session's accepted timestamps
    pub fn elapsed(&self) -> Duration {
        match (self.session_started, self.last_timestamp) {
            (Some(start), Some(last)) => last.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Time since the last progress tick, measured at `now`
    ///
    /// Falls back to the session start when no progress was seen yet.
    pub fn idle_for(&self, now: Instant) -> Duration {
        self.last_progress_at
            .or(self.session_started)
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for DetectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (size {}, stagnant {}/{}, ticks {})",
            self.status(),
            self.last_size,
            self.stagnant_count,
            self.patience_limit,
            self.total_ticks
        )
    }
}

/// One entry of the detector's tick trace, handed to visualizers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRecord {
    /// Clamped size that was observed
    pub size: u64,

    pub outcome: TickOutcome,

    /// Stagnant counter after this tick
    pub stagnant_count: usize,

    /// Patience limit that was applied to this tick
    pub patience_limit: usize,

    pub decision: Decision,
}
