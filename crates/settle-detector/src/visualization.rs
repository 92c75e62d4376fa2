//! Visualization interface for stabilization detection
//!
//! The detector hands every tick to a [`DetectorVisualizer`]. The default
//! [`NullDetectorVisualizer`] compiles away; [`RecordingVisualizer`] keeps the
//! full trace, which is handy when tuning parameters against a real feed.

use crate::types::{TickOutcome, TickRecord};

/// Receives the detector's per-tick decisions
pub trait DetectorVisualizer: Send + Sync {
    /// Record one classified observation
    fn record_tick(&mut self, tick: &TickRecord);

    /// The detector was reset; drop any per-session data
    fn reset(&mut self);
}

/// Visualizer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDetectorVisualizer;

impl NullDetectorVisualizer {
    pub fn new() -> Self {
        Self
    }
}

impl DetectorVisualizer for NullDetectorVisualizer {
    #[inline(always)]
    fn record_tick(&mut self, _tick: &TickRecord) {}

    #[inline(always)]
    fn reset(&mut self) {}
}

/// Visualizer that keeps the tick trace of the current session
#[derive(Debug, Default, Clone)]
pub struct RecordingVisualizer {
    ticks: Vec<TickRecord>,
    sessions: usize,
}

impl RecordingVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> &[TickRecord] {
        &self.ticks
    }

    /// Number of resets seen
    pub fn sessions_reset(&self) -> usize {
        self.sessions
    }

    pub fn count(&self, outcome: TickOutcome) -> usize {
        self.ticks.iter().filter(|t| t.outcome == outcome).count()
    }

    /// Longest run of consecutive stagnant (or exhausting) ticks
    pub fn longest_stall(&self) -> usize {
        self.ticks
            .iter()
            .map(|t| t.stagnant_count)
            .max()
            .unwrap_or(0)
    }
}

impl DetectorVisualizer for RecordingVisualizer {
    fn record_tick(&mut self, tick: &TickRecord) {
        self.ticks.push(*tick);
    }

    fn reset(&mut self) {
        self.ticks.clear();
        self.sessions += 1;
    }
}
