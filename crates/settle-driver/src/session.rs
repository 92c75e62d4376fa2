//! The polling loop
//!
//! A [`ScrollSession`] owns one detector, one size source and one pacer. Each
//! tick it measures the content, feeds the detector and waits for the
//! advised delay, until the detector says stop. A session is split into
//! phases: switching to another tab or list starts a new phase with a fresh
//! detector session, while the summaries of earlier phases are kept.

use crate::cancel::CancelHandle;
use crate::config::SessionConfig;
use crate::events::{EventBus, EventHandler, SessionEvent};
use crate::pacer::Pacer;
use crate::report::{duration_ms, MeasurementHistory, PhaseOutcome, PhaseSummary, SessionReport};
use crate::source::SizeSource;
use settle_core::{Error, IntoSize, Observation, Result};
use settle_detector::{Decision, OnlineCompletionDetector, StabilizationDetector};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Label of the phase a session starts in
pub const INITIAL_PHASE: &str = "main";

/// Book-keeping of the phase in progress
#[derive(Debug)]
struct PhaseState {
    label: String,
    started: Instant,
    announced: bool,
    finished: bool,
    ticks: usize,
    failed_ticks: usize,
    consecutive_failures: usize,
    peak_size: u64,
    history: MeasurementHistory,
}

impl PhaseState {
    fn new(label: &str) -> Self {
        let now = Instant::now();
        Self {
            label: label.to_string(),
            started: now,
            announced: false,
            finished: false,
            ticks: 0,
            failed_ticks: 0,
            consecutive_failures: 0,
            peak_size: 0,
            history: MeasurementHistory::new(now),
        }
    }

    fn polls(&self) -> usize {
        self.ticks.saturating_add(self.failed_ticks)
    }

    fn is_untouched(&self) -> bool {
        self.polls() == 0
    }
}

/// Drives a feed to completion
///
/// # Example
///
/// ```rust
/// use settle_detector::DetectorParameters;
/// use settle_driver::{PhaseOutcome, RecordingPacer, ScriptedSource, ScrollSession, SessionConfig};
///
/// let config = SessionConfig::new(DetectorParameters::fixed(3));
/// let source = ScriptedSource::new(vec![10u64, 25, 40]);
/// let mut session = ScrollSession::new(config, source, RecordingPacer::new()).unwrap();
///
/// let summary = session.run().unwrap();
/// assert_eq!(summary.outcome, PhaseOutcome::Completed);
/// assert_eq!(summary.final_size, 40);
/// ```
pub struct ScrollSession<S, P, D = StabilizationDetector>
where
    S: SizeSource,
    P: Pacer,
    D: OnlineCompletionDetector,
{
    id: Uuid,
    config: SessionConfig,
    detector: D,
    source: S,
    pacer: P,
    cancel: CancelHandle,
    events: EventBus,
    phase: PhaseState,
    finished: Vec<PhaseSummary>,
}

impl<S: SizeSource, P: Pacer> ScrollSession<S, P> {
    /// Create a session driving a [`StabilizationDetector`] built from the config
    pub fn new(config: SessionConfig, source: S, pacer: P) -> Result<Self> {
        config.validate()?;
        let detector = StabilizationDetector::try_new(config.detector)?;
        Ok(Self::assemble(config, detector, source, pacer))
    }
}

impl<S, P, D> ScrollSession<S, P, D>
where
    S: SizeSource,
    P: Pacer,
    D: OnlineCompletionDetector,
{
    /// Create a session around a caller-supplied detector
    ///
    /// The detector is reset first; `config.detector` is not used to build it.
    /// It still supplies the failure delay when `failure_delay_ms` is unset.
    pub fn with_detector(config: SessionConfig, mut detector: D, source: S, pacer: P) -> Result<Self> {
        config.validate()?;
        detector.reset();
        Ok(Self::assemble(config, detector, source, pacer))
    }

    fn assemble(config: SessionConfig, detector: D, source: S, pacer: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            detector,
            source,
            pacer,
            cancel: CancelHandle::new(),
            events: EventBus::new(),
            phase: PhaseState::new(INITIAL_PHASE),
            finished: Vec::new(),
        }
    }

    /// Use an externally created cancel flag (e.g. one shared with a [`ThreadPacer`](crate::ThreadPacer))
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A clone of the session's cancel flag
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn register_handler<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.events.register(handler);
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Label of the current phase
    pub fn phase_label(&self) -> &str {
        &self.phase.label
    }

    /// Whether the current phase already has a summary
    pub fn is_phase_finished(&self) -> bool {
        self.phase.finished
    }

    /// Measurements of the current phase; empty unless history keeping is on
    pub fn history(&self) -> &MeasurementHistory {
        &self.phase.history
    }

    /// Summaries of the finished phases, oldest first
    pub fn phases(&self) -> &[PhaseSummary] {
        &self.finished
    }

    fn announce(&mut self) {
        if self.phase.announced {
            return;
        }
        let now = Instant::now();
        self.phase.announced = true;
        self.phase.started = now;
        self.phase.history.clear(now);
        self.events.emit(&SessionEvent::PhaseStarted {
            session_id: self.id,
            label: self.phase.label.clone(),
        });
    }

    /// Take one measurement and feed it to the detector
    ///
    /// A failed measurement returns `Continue` with the failure delay, until
    /// `max_consecutive_failures` failures in a row turn it into
    /// [`Error::SourceExhausted`]. Once the detector has stopped, no further
    /// measurements are taken and `Stop` is returned. The tick that stops the
    /// detector closes the phase as `Completed`.
    pub fn step(&mut self) -> Result<Decision> {
        if self.phase.finished {
            return Ok(Decision::Stop);
        }
        if !self.detector.is_active() {
            self.finish_phase(PhaseOutcome::Completed);
            return Ok(Decision::Stop);
        }
        self.announce();

        let measured = self.source.measure();
        let now = Instant::now();
        match measured {
            Ok(raw) => {
                let size = raw.into_size();
                self.phase.consecutive_failures = 0;
                self.phase.ticks += 1;
                self.phase.peak_size = self.phase.peak_size.max(size);
                if self.config.keep_history {
                    self.phase.history.push(Observation::new(size, now));
                }

                let decision = self.detector.observe(size, now);
                self.events.emit(&SessionEvent::Tick {
                    session_id: self.id,
                    tick: self.phase.ticks,
                    size,
                    stagnant_count: self.detector.state().stagnant_count,
                    decision,
                });
                if decision.is_stop() {
                    self.finish_phase(PhaseOutcome::Completed);
                }
                Ok(decision)
            }
            Err(err) => {
                self.phase.failed_ticks += 1;
                self.phase.consecutive_failures += 1;
                let failures = self.phase.consecutive_failures;
                self.events.emit(&SessionEvent::SourceFailed {
                    session_id: self.id,
                    consecutive: failures,
                    error: err.to_string(),
                });

                if failures >= self.config.max_consecutive_failures {
                    warn!(failures, error = %err, "giving up on size source");
                    return Err(Error::SourceExhausted { failures });
                }
                Ok(Decision::Continue {
                    delay_ms: self.config.failure_delay(),
                })
            }
        }
    }

    /// Drive the current phase to its end
    ///
    /// Loops over [`step`](Self::step) and the pacer until the detector says
    /// stop, the cancel flag is raised, or the tick limit is reached. A source
    /// that fails too often ends the phase as `Failed` and returns the error.
    /// Calling `run` on a finished phase returns its summary again, or the
    /// same error if the phase failed.
    #[instrument(skip(self), fields(session_id = %self.id, phase = %self.phase.label))]
    pub fn run(&mut self) -> Result<PhaseSummary> {
        if let Some(summary) = self.finished_summary() {
            if summary.outcome == PhaseOutcome::Failed {
                return Err(Error::SourceExhausted {
                    failures: self.phase.consecutive_failures,
                });
            }
            return Ok(summary);
        }

        loop {
            if self.cancel.is_cancelled() {
                return Ok(self.finish_phase(PhaseOutcome::Cancelled));
            }
            if let Some(limit) = self.config.max_ticks_per_phase {
                if self.phase.polls() >= limit {
                    return Ok(self.finish_phase(PhaseOutcome::TickLimit));
                }
            }

            let decision = match self.step() {
                Ok(decision) => decision,
                Err(err) => {
                    self.finish_phase(PhaseOutcome::Failed);
                    return Err(err);
                }
            };

            match decision.delay() {
                Some(delay) => self.pacer.pause(delay),
                None => {
                    return Ok(match self.finished_summary() {
                        Some(summary) => summary,
                        None => self.finish_phase(PhaseOutcome::Completed),
                    })
                }
            }
        }
    }

    /// Start a new phase for a new context, such as another tab
    ///
    /// An unfinished phase that already polled is closed as `Cancelled`; one
    /// that never polled is dropped. The detector and the measurement history
    /// start over. The cancel flag is left as it is.
    pub fn begin_phase(&mut self, label: &str) {
        if !self.phase.finished && !self.phase.is_untouched() {
            self.finish_phase(PhaseOutcome::Cancelled);
        }
        debug!(session_id = %self.id, label, "switching phase");
        self.detector.reset();
        self.phase = PhaseState::new(label);
    }

    /// Summary of the current phase, once it has finished
    pub fn finished_summary(&self) -> Option<PhaseSummary> {
        if self.phase.finished {
            self.finished.last().cloned()
        } else {
            None
        }
    }

    /// Report over all finished phases
    ///
    /// The phase in progress is not included until it finishes.
    pub fn report(&self) -> SessionReport {
        SessionReport::new(self.id, self.finished.clone())
    }

    fn finish_phase(&mut self, outcome: PhaseOutcome) -> PhaseSummary {
        self.announce();
        self.phase.finished = true;

        let state = self.detector.state();
        let summary = PhaseSummary {
            label: self.phase.label.clone(),
            outcome,
            ticks: self.phase.ticks,
            failed_ticks: self.phase.failed_ticks,
            final_size: state.last_size,
            peak_size: self.phase.peak_size,
            duration_ms: duration_ms(self.phase.started.elapsed()),
            history: self.phase.history.points(),
        };

        self.events.emit(&SessionEvent::PhaseFinished {
            session_id: self.id,
            label: summary.label.clone(),
            outcome,
            ticks: summary.ticks,
            final_size: summary.final_size,
        });
        self.finished.push(summary.clone());
        summary
    }
}

impl<S, P, D> std::fmt::Debug for ScrollSession<S, P, D>
where
    S: SizeSource,
    P: Pacer,
    D: OnlineCompletionDetector,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSession")
            .field("id", &self.id)
            .field("phase", &self.phase.label)
            .field("detector", &self.detector.state())
            .field("finished_phases", &self.finished.len())
            .field("events", &self.events)
            .finish()
    }
}
