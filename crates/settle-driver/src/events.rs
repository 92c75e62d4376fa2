//! Session event notification
//!
//! The session reports what it does through [`SessionEvent`]s so that
//! logging, metrics and progress displays can observe a run without being
//! wired into the polling loop.

use crate::report::PhaseOutcome;
use settle_detector::Decision;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Event emitted by a running session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new phase began (session start or context change)
    PhaseStarted { session_id: Uuid, label: String },

    /// One measurement was fed to the detector
    Tick {
        session_id: Uuid,
        tick: usize,
        size: u64,
        stagnant_count: usize,
        decision: Decision,
    },

    /// The size source failed to produce a measurement
    SourceFailed {
        session_id: Uuid,
        consecutive: usize,
        error: String,
    },

    /// A phase ended
    PhaseFinished {
        session_id: Uuid,
        label: String,
        outcome: PhaseOutcome,
        ticks: usize,
        final_size: u64,
    },
}

/// Trait for handling session events
pub trait EventHandler: Send + Sync {
    fn handle_event(&self, event: &SessionEvent);

    /// Check if this handler is interested in a particular event type
    fn is_interested(&self, event: &SessionEvent) -> bool {
        let _ = event;
        true
    }

    /// Get the name of this handler for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Distributes events to the registered handlers
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Box<dyn EventHandler>>,
    disabled: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Deliver an event to every interested handler
    pub fn emit(&self, event: &SessionEvent) {
        if self.disabled {
            return;
        }
        for handler in &self.handlers {
            if handler.is_interested(event) {
                handler.handle_event(event);
            }
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_names())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Writes events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler {
    ticks: bool,
}

impl LoggingHandler {
    /// Log phase boundaries and source failures
    pub fn new() -> Self {
        Self { ticks: false }
    }

    /// Also log every tick at debug level
    pub fn with_ticks() -> Self {
        Self { ticks: true }
    }
}

impl EventHandler for LoggingHandler {
    fn handle_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::PhaseStarted { session_id, label } => {
                info!(%session_id, %label, "phase started");
            }
            SessionEvent::Tick {
                tick,
                size,
                stagnant_count,
                decision,
                ..
            } => {
                debug!(tick, size, stagnant_count, %decision, "tick");
            }
            SessionEvent::SourceFailed {
                session_id,
                consecutive,
                error,
            } => {
                warn!(%session_id, consecutive, %error, "size source failed");
            }
            SessionEvent::PhaseFinished {
                session_id,
                label,
                outcome,
                ticks,
                final_size,
            } => {
                info!(%session_id, %label, ?outcome, ticks, final_size, "phase finished");
            }
        }
    }

    fn is_interested(&self, event: &SessionEvent) -> bool {
        self.ticks || !matches!(event, SessionEvent::Tick { .. })
    }
}

/// Counters accumulated from session events
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionMetrics {
    pub phases_started: usize,
    pub phases_completed: usize,
    pub phases_cancelled: usize,
    pub phases_failed: usize,
    pub phases_tick_limited: usize,
    pub ticks: usize,
    pub stagnant_ticks: usize,
    pub source_failures: usize,
}

/// Metrics collection handler
///
/// Clones share their counters: keep one clone and register the other.
#[derive(Debug, Default, Clone)]
pub struct MetricsHandler {
    metrics: Arc<Mutex<SessionMetrics>>,
}

impl MetricsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> SessionMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EventHandler for MetricsHandler {
    fn handle_event(&self, event: &SessionEvent) {
        let mut metrics = self
            .metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match event {
            SessionEvent::PhaseStarted { .. } => metrics.phases_started += 1,
            SessionEvent::Tick { stagnant_count, .. } => {
                metrics.ticks += 1;
                if *stagnant_count > 0 {
                    metrics.stagnant_ticks += 1;
                }
            }
            SessionEvent::SourceFailed { .. } => metrics.source_failures += 1,
            SessionEvent::PhaseFinished { outcome, .. } => match outcome {
                PhaseOutcome::Completed => metrics.phases_completed += 1,
                PhaseOutcome::Cancelled => metrics.phases_cancelled += 1,
                PhaseOutcome::Failed => metrics.phases_failed += 1,
                PhaseOutcome::TickLimit => metrics.phases_tick_limited += 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(stagnant_count: usize) -> SessionEvent {
        SessionEvent::Tick {
            session_id: Uuid::nil(),
            tick: 0,
            size: 10,
            stagnant_count,
            decision: Decision::Continue { delay_ms: 100 },
        }
    }

    #[test]
    fn test_event_bus() {
        let mut bus = EventBus::new();
        let metrics = MetricsHandler::new();
        bus.register(LoggingHandler::new());
        bus.register(metrics.clone());
        assert_eq!(bus.handler_count(), 2);

        bus.emit(&SessionEvent::PhaseStarted {
            session_id: Uuid::new_v4(),
            label: "likes".to_string(),
        });
        bus.emit(&tick(0));
        bus.emit(&tick(1));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.phases_started, 1);
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.stagnant_ticks, 1);
    }

    #[test]
    fn test_disabled_bus_drops_events() {
        let mut bus = EventBus::new();
        let metrics = MetricsHandler::new();
        bus.register(metrics.clone());
        bus.set_enabled(false);
        assert!(!bus.is_enabled());

        bus.emit(&tick(0));
        assert_eq!(metrics.snapshot().ticks, 0);
    }

    #[test]
    fn test_logging_handler_interest() {
        assert!(!LoggingHandler::new().is_interested(&tick(0)));
        assert!(LoggingHandler::with_ticks().is_interested(&tick(0)));
        assert!(LoggingHandler::new().is_interested(&SessionEvent::SourceFailed {
            session_id: Uuid::nil(),
            consecutive: 1,
            error: "timeout".to_string(),
        }));
    }

    #[test]
    fn test_metrics_phase_outcomes() {
        let metrics = MetricsHandler::new();
        for outcome in [
            PhaseOutcome::Completed,
            PhaseOutcome::Cancelled,
            PhaseOutcome::TickLimit,
            PhaseOutcome::Failed,
        ] {
            metrics.handle_event(&SessionEvent::PhaseFinished {
                session_id: Uuid::nil(),
                label: "reposts".to_string(),
                outcome,
                ticks: 3,
                final_size: 12,
            });
        }
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.phases_completed, 1);
        assert_eq!(snapshot.phases_cancelled, 1);
        assert_eq!(snapshot.phases_failed, 1);
        assert_eq!(snapshot.phases_tick_limited, 1);
    }
}
