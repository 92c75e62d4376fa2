//! # Feed Stabilization Detection
//!
//! This crate decides when a continuously growing feed has stopped growing.
//! A driver measures the content size once per tick (element count, scroll
//! height) and feeds it to a [`StabilizationDetector`], which answers with a
//! [`Decision`]: keep going after an advisory delay, or stop.
//!
//! ## Key Features
//!
//! - **Noise tolerant**: growth below a configurable threshold is not progress
//! - **Growing patience**: long sessions tolerate longer load stalls
//! - **Advisory backoff**: polling delay rises with consecutive stagnant ticks
//! - **Total**: malformed sizes are clamped, the detector never fails
//! - **Pluggable tracing**: per-tick visualizer hook with a zero-cost default

pub mod detector;
pub mod params;
pub mod schedule;
pub mod traits;
pub mod types;
pub mod visualization;

// Re-exports
pub use detector::StabilizationDetector;
pub use params::{BaselineMode, DetectorParameters};
pub use schedule::{BackoffSchedule, PatienceSchedule};
pub use traits::OnlineCompletionDetector;
pub use types::{Decision, DetectorState, DetectorStatus, TickOutcome, TickRecord};
pub use visualization::{DetectorVisualizer, NullDetectorVisualizer, RecordingVisualizer};
