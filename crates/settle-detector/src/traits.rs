//! Core traits for completion detection
//!
//! Drivers are written against [`OnlineCompletionDetector`] so that a
//! different stopping rule can be swapped in without touching the polling
//! loop.

use crate::types::{Decision, DetectorState};
use settle_core::IntoSize;
use std::time::Instant;

/// Trait for online (tick-by-tick) completion detection
///
/// Implementations must be total: every observation yields a decision and
/// malformed sizes are clamped, never rejected.
pub trait OnlineCompletionDetector {
    /// Feed one clamped size observation and get the next action
    fn observe(&mut self, size: u64, now: Instant) -> Decision;

    /// Start a fresh session without discarding the detector
    fn reset(&mut self);

    /// Whether the detector still expects observations
    fn is_active(&self) -> bool;

    /// Snapshot of the current counters
    fn state(&self) -> DetectorState;

    /// Feed a raw numeric measurement, clamping it first
    fn observe_value<S: IntoSize>(&mut self, value: S, now: Instant) -> Decision
    where
        Self: Sized,
    {
        self.observe(value.into_size(), now)
    }
}
