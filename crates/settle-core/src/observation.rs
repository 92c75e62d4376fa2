//! A single content-size measurement

use crate::size::IntoSize;
use std::time::{Duration, Instant};

/// One polling tick's measurement as produced by a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Clamped content size (element count or scroll height)
    pub size: u64,

    /// Monotonic instant at which the size was read
    pub timestamp: Instant,
}

impl Observation {
    /// Create an observation, clamping the raw size
    pub fn new<S: IntoSize>(size: S, timestamp: Instant) -> Self {
        Self {
            size: size.into_size(),
            timestamp,
        }
    }

    /// Observation taken right now
    pub fn now<S: IntoSize>(size: S) -> Self {
        Self::new(size, Instant::now())
    }

    /// Time elapsed between `origin` and this observation
    ///
    /// Returns zero when `origin` is later than the observation.
    pub fn offset_from(&self, origin: Instant) -> Duration {
        self.timestamp.saturating_duration_since(origin)
    }
}
