//! Phase summaries and session reports
//!
//! These are the driver's records of a run. They derive `Serialize` so an
//! exporter can write them out in whatever format it likes.

use serde::Serialize;
use settle_core::{Error, Observation, Result};
use std::time::Instant;
use uuid::Uuid;

/// How a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOutcome {
    /// The detector declared the feed finished
    Completed,

    /// The caller cancelled or abandoned the phase
    Cancelled,

    /// The configured tick limit was hit before the feed settled
    TickLimit,

    /// The size source failed too often
    Failed,
}

impl PhaseOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PhaseOutcome::Completed)
    }
}

/// One measurement relative to the start of its phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    pub offset_ms: u64,
    pub size: u64,
}

/// Measurements collected during the current phase
#[derive(Debug, Clone)]
pub struct MeasurementHistory {
    origin: Instant,
    observations: Vec<Observation>,
}

impl MeasurementHistory {
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            observations: Vec::new(),
        }
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub fn clear(&mut self, origin: Instant) {
        self.origin = origin;
        self.observations.clear();
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    pub fn peak(&self) -> u64 {
        self.observations.iter().map(|o| o.size).max().unwrap_or(0)
    }

    pub fn latest(&self) -> Option<u64> {
        self.observations.last().map(|o| o.size)
    }

    pub fn points(&self) -> Vec<HistoryPoint> {
        self.observations
            .iter()
            .map(|o| HistoryPoint {
                offset_ms: duration_ms(o.offset_from(self.origin)),
                size: o.size,
            })
            .collect()
    }
}

/// Summary of one finished phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub label: String,
    pub outcome: PhaseOutcome,

    /// Measurements fed to the detector
    pub ticks: usize,

    /// Polls where the source failed
    pub failed_ticks: usize,

    /// Size at the last progress tick
    pub final_size: u64,

    /// Largest size observed
    pub peak_size: u64,

    /// Wall-clock duration of the phase
    pub duration_ms: u64,

    /// Measurement trace, empty unless history keeping is enabled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryPoint>,
}

/// Everything a session did, phase by phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub phases: Vec<PhaseSummary>,
    pub total_ticks: usize,
    pub total_failed_ticks: usize,
}

impl SessionReport {
    pub fn new(session_id: Uuid, phases: Vec<PhaseSummary>) -> Self {
        let total_ticks = phases.iter().map(|p| p.ticks).sum();
        let total_failed_ticks = phases.iter().map(|p| p.failed_ticks).sum();
        Self {
            session_id,
            phases,
            total_ticks,
            total_failed_ticks,
        }
    }

    pub fn phase(&self, label: &str) -> Option<&PhaseSummary> {
        self.phases.iter().find(|p| p.label == label)
    }

    pub fn all_completed(&self) -> bool {
        !self.phases.is_empty() && self.phases.iter().all(|p| p.outcome.is_completed())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(e.into()))
    }
}

pub(crate) fn duration_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn summary(label: &str, outcome: PhaseOutcome, ticks: usize) -> PhaseSummary {
        PhaseSummary {
            label: label.to_string(),
            outcome,
            ticks,
            failed_ticks: 1,
            final_size: 40,
            peak_size: 42,
            duration_ms: 9_000,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_history_points() {
        let origin = Instant::now();
        let mut history = MeasurementHistory::new(origin);
        history.push(Observation::new(10u64, origin + Duration::from_millis(500)));
        history.push(Observation::new(35u64, origin + Duration::from_millis(3_500)));
        history.push(Observation::new(30u64, origin + Duration::from_millis(6_500)));

        assert_eq!(history.len(), 3);
        assert_eq!(history.peak(), 35);
        assert_eq!(history.latest(), Some(30));
        assert_eq!(
            history.points()[1],
            HistoryPoint {
                offset_ms: 3_500,
                size: 35
            }
        );

        history.clear(origin);
        assert!(history.is_empty());
        assert_eq!(history.peak(), 0);
    }

    #[test]
    fn test_report_totals() {
        let report = SessionReport::new(
            Uuid::nil(),
            vec![
                summary("quotes", PhaseOutcome::Completed, 12),
                summary("reposts", PhaseOutcome::Completed, 30),
            ],
        );
        assert_eq!(report.total_ticks, 42);
        assert_eq!(report.total_failed_ticks, 2);
        assert!(report.all_completed());
        assert_eq!(report.phase("reposts").map(|p| p.ticks), Some(30));
        assert!(report.phase("likes").is_none());
    }

    #[test]
    fn test_empty_report_is_not_completed() {
        assert!(!SessionReport::new(Uuid::nil(), Vec::new()).all_completed());
    }

    #[test]
    fn test_report_json() {
        let report = SessionReport::new(
            Uuid::nil(),
            vec![summary("quotes", PhaseOutcome::TickLimit, 5)],
        );
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["phases"][0]["outcome"], "tick_limit");
        assert_eq!(value["phases"][0]["label"], "quotes");
        assert_eq!(value["total_ticks"], 5);
        assert!(value["phases"][0].get("history").is_none());
    }
}
