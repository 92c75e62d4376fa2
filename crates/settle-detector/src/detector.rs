//! Stabilization detector for growing feeds
//!
//! The detector watches a stream of content-size observations and decides
//! when a feed that is being driven forward (scrolled, paged, polled) has
//! stopped growing. It owns no timers and performs no I/O; the driver calls
//! [`StabilizationDetector::observe`] once per tick and paces itself with the
//! advisory delay in the returned [`Decision`].

use crate::params::{BaselineMode, DetectorParameters};
use crate::schedule::{BackoffSchedule, PatienceSchedule};
use crate::traits::OnlineCompletionDetector;
use crate::types::{Decision, DetectorState, DetectorStatus, TickOutcome, TickRecord};
use crate::visualization::{DetectorVisualizer, NullDetectorVisualizer};
use settle_core::{IntoSize, Result};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Content-stabilization detector
///
/// Two states: `Active` (initial) and `Stopped` (terminal until
/// [`reset`](Self::reset)). The detector stops exactly once per session,
/// on the tick where the consecutive stagnant count reaches the patience
/// limit. The limit grows with the number of ticks seen.
///
/// # Type Parameters
///
/// - `V`: visualizer receiving every tick, [`NullDetectorVisualizer`] by default
///
/// # Example
///
/// ```rust
/// use settle_detector::{Decision, DetectorParameters, StabilizationDetector};
/// use std::time::{Duration, Instant};
///
/// let mut detector = StabilizationDetector::new(DetectorParameters::fixed(3));
/// let start = Instant::now();
///
/// let sizes = [10u64, 25, 40, 40, 40, 40];
/// let mut stopped_at = None;
/// for (i, size) in sizes.iter().enumerate() {
///     let now = start + Duration::from_secs(i as u64);
///     if detector.observe(*size, now) == Decision::Stop {
///         stopped_at = Some(i);
///         break;
///     }
/// }
/// assert_eq!(stopped_at, Some(5));
/// assert!(!detector.is_active());
/// ```
pub struct StabilizationDetector<V: DetectorVisualizer = NullDetectorVisualizer> {
    params: DetectorParameters,
    patience: PatienceSchedule,
    backoff: BackoffSchedule,

    last_size: u64,
    seeded: bool,
    stagnant_count: usize,
    total_ticks: usize,
    active: bool,

    session_started: Option<Instant>,
    last_timestamp: Option<Instant>,
    last_progress_at: Option<Instant>,

    visualizer: V,
}

impl StabilizationDetector<NullDetectorVisualizer> {
    /// Create a detector, repairing invalid parameter combinations
    pub fn new(params: DetectorParameters) -> Self {
        Self::with_visualizer(NullDetectorVisualizer::new(), params)
    }

    /// Create a detector, rejecting invalid parameters
    pub fn try_new(params: DetectorParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self::new(params))
    }
}

impl Default for StabilizationDetector<NullDetectorVisualizer> {
    fn default() -> Self {
        Self::new(DetectorParameters::default())
    }
}

impl<V: DetectorVisualizer> StabilizationDetector<V> {
    /// Create a detector with a custom visualizer
    pub fn with_visualizer(visualizer: V, params: DetectorParameters) -> Self {
        let params = params.sanitized();
        Self {
            patience: PatienceSchedule::from(&params),
            backoff: BackoffSchedule::from(&params),
            last_size: 0,
            seeded: params.baseline == BaselineMode::Zero,
            stagnant_count: 0,
            total_ticks: 0,
            active: true,
            session_started: None,
            last_timestamp: None,
            last_progress_at: None,
            params,
            visualizer,
        }
    }

    pub fn parameters(&self) -> &DetectorParameters {
        &self.params
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    pub fn into_visualizer(self) -> V {
        self.visualizer
    }

    /// Feed one observation and decide whether to keep going
    ///
    /// Once the detector has stopped, every further call returns
    /// [`Decision::Stop`] and leaves the counters untouched.
    pub fn observe(&mut self, size: u64, now: Instant) -> Decision {
        if !self.active {
            self.visualizer.record_tick(&TickRecord {
                size,
                outcome: TickOutcome::Ignored,
                stagnant_count: self.stagnant_count,
                patience_limit: self.patience_limit(),
                decision: Decision::Stop,
            });
            return Decision::Stop;
        }

        self.accept_timestamp(now);

        let limit = self.patience.limit_at(self.total_ticks);
        self.total_ticks = self.total_ticks.saturating_add(1);

        let grew = if self.seeded {
            size.saturating_sub(self.last_size) > self.params.min_growth_threshold
        } else {
            self.last_size = size;
            self.seeded = true;
            false
        };

        let (outcome, decision) = if grew {
            self.last_size = size;
            self.stagnant_count = 0;
            self.last_progress_at = self.last_timestamp;
            (
                TickOutcome::Progress,
                Decision::Continue {
                    delay_ms: self.backoff.delay_for(0),
                },
            )
        } else {
            self.stagnant_count = self.stagnant_count.saturating_add(1);
            if self.stagnant_count >= limit {
                self.active = false;
                debug!(
                    last_size = self.last_size,
                    stagnant = self.stagnant_count,
                    limit,
                    ticks = self.total_ticks,
                    "feed stabilized, patience exhausted"
                );
                (TickOutcome::Exhausted, Decision::Stop)
            } else {
                (
                    TickOutcome::Stagnant,
                    Decision::Continue {
                        delay_ms: self.backoff.delay_for(self.stagnant_count),
                    },
                )
            }
        };

        trace!(size, ?outcome, stagnant = self.stagnant_count, limit, "tick");

        self.visualizer.record_tick(&TickRecord {
            size,
            outcome,
            stagnant_count: self.stagnant_count,
            patience_limit: limit,
            decision,
        });

        decision
    }

    /// Feed a raw numeric measurement, clamping negatives and non-finite values to zero
    pub fn observe_value<S: IntoSize>(&mut self, value: S, now: Instant) -> Decision {
        self.observe(value.into_size(), now)
    }

    /// Reinitialize all counters and reactivate the detector
    pub fn reset(&mut self) {
        self.last_size = 0;
        self.seeded = self.params.baseline == BaselineMode::Zero;
        self.stagnant_count = 0;
        self.total_ticks = 0;
        self.active = true;
        self.session_started = None;
        self.last_timestamp = None;
        self.last_progress_at = None;
        self.visualizer.reset();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn status(&self) -> DetectorStatus {
        if self.active {
            DetectorStatus::Active
        } else {
            DetectorStatus::Stopped
        }
    }

    pub fn stagnant_count(&self) -> usize {
        self.stagnant_count
    }

    pub fn total_ticks(&self) -> usize {
        self.total_ticks
    }

    pub fn last_size(&self) -> u64 {
        self.last_size
    }

    /// Patience limit that applies to the next observation
    pub fn patience_limit(&self) -> usize {
        self.patience.limit_at(self.total_ticks)
    }

    /// Patience limit for an arbitrary tick count
    pub fn patience_limit_at(&self, total_ticks: usize) -> usize {
        self.patience.limit_at(total_ticks)
    }

    /// Advisory delay for a given stagnant count
    pub fn backoff_for(&self, stagnant_count: usize) -> Duration {
        Duration::from_millis(self.backoff.delay_for(stagnant_count))
    }

    pub fn state(&self) -> DetectorState {
        DetectorState {
            last_size: self.last_size,
            stagnant_count: self.stagnant_count,
            total_ticks: self.total_ticks,
            patience_limit: self.patience_limit(),
            active: self.active,
            session_started: self.session_started,
            last_timestamp: self.last_timestamp,
            last_progress_at: self.last_progress_at,
        }
    }

    // Non-monotonic timestamps are dropped; the size is still evaluated.
    fn accept_timestamp(&mut self, now: Instant) {
        match self.last_timestamp {
            Some(last) if now < last => {
                trace!(behind = ?last.duration_since(now), "ignoring non-monotonic timestamp");
            }
            _ => {
                self.session_started.get_or_insert(now);
                self.last_timestamp = Some(now);
            }
        }
    }
}

impl<V: DetectorVisualizer> OnlineCompletionDetector for StabilizationDetector<V> {
    fn observe(&mut self, size: u64, now: Instant) -> Decision {
        StabilizationDetector::observe(self, size, now)
    }

    fn reset(&mut self) {
        StabilizationDetector::reset(self)
    }

    fn is_active(&self) -> bool {
        StabilizationDetector::is_active(self)
    }

    fn state(&self) -> DetectorState {
        StabilizationDetector::state(self)
    }
}

impl<V: DetectorVisualizer> std::fmt::Debug for StabilizationDetector<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StabilizationDetector")
            .field("params", &self.params)
            .field("last_size", &self.last_size)
            .field("stagnant_count", &self.stagnant_count)
            .field("total_ticks", &self.total_ticks)
            .field("active", &self.active)
            .finish()
    }
}
