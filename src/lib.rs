//! # scroll-settle
//!
//! Decides when an infinitely scrolling feed has finished loading.
//!
//! The workspace is split into three crates, re-exported here:
//!
//! - [`settle_core`]: error type, size clamping and observations
//! - [`settle_detector`]: the
//!   [`StabilizationDetector`](settle_detector::StabilizationDetector) and its
//!   patience and backoff schedules
//! - [`settle_driver`]: the polling loop, size sources, pacers and session
//!   reports
//!
//! # Example
//!
//! ```rust
//! use scroll_settle::prelude::*;
//! use std::time::Instant;
//!
//! let mut detector = StabilizationDetector::new(DetectorParameters::fixed(2));
//! let now = Instant::now();
//! assert!(detector.observe(120, now).is_continue());
//! assert!(detector.observe(160, now).is_continue());
//! assert!(detector.observe(160, now).is_continue());
//! assert!(detector.observe(161, now).is_stop());
//! ```

pub use settle_core;
pub use settle_detector;
pub use settle_driver;

pub use settle_core::{Error, Result, VERSION};

/// Prelude module for convenient imports
pub mod prelude {
    pub use settle_core::prelude::*;
    pub use settle_detector::{
        BaselineMode, Decision, DetectorParameters, OnlineCompletionDetector,
        StabilizationDetector,
    };
    pub use settle_driver::{
        CancelHandle, PhaseOutcome, PhaseSummary, ScriptedSource, ScrollSession, SessionConfig,
        SessionReport, SizeSource, ThreadPacer,
    };
}
