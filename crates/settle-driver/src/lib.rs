//! # Feed Driver
//!
//! Polling loop around a stabilization detector. A [`ScrollSession`] measures
//! the content through a [`SizeSource`], hands each measurement to the
//! detector and waits with a [`Pacer`] for the advised delay, until the feed
//! stops growing.
//!
//! Sessions are split into phases (one per tab or list). Each finished phase
//! leaves a [`PhaseSummary`]; [`ScrollSession::report`] collects them into a
//! serializable [`SessionReport`].

pub mod cancel;
pub mod config;
pub mod events;
pub mod pacer;
pub mod report;
pub mod session;
pub mod source;

pub use cancel::CancelHandle;
pub use config::SessionConfig;
pub use events::{EventBus, EventHandler, LoggingHandler, MetricsHandler, SessionEvent, SessionMetrics};
pub use pacer::{Pacer, RecordingPacer, ThreadPacer};
pub use report::{HistoryPoint, MeasurementHistory, PhaseOutcome, PhaseSummary, SessionReport};
pub use session::{ScrollSession, INITIAL_PHASE};
pub use source::{MaxOfSources, ScriptedSource, SizeSource};
