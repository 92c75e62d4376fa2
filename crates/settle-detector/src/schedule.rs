//! Patience and backoff schedules
//!
//! Both schedules are pure functions of a counter. Patience grows with the
//! session length: early on a stagnant tick is usually load latency, late in
//! a long feed a run of stagnant ticks is stronger evidence of the end.

use crate::params::DetectorParameters;

/// Patience limit as a non-decreasing function of elapsed ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatienceSchedule {
    pub base: usize,
    pub ticks_per_step: usize,
    pub ceiling: Option<usize>,
}

impl PatienceSchedule {
    pub fn new(base: usize, ticks_per_step: usize) -> Self {
        Self {
            base,
            ticks_per_step,
            ceiling: None,
        }
    }

    /// `base + floor(total_ticks / ticks_per_step)`, capped by the ceiling
    pub fn limit_at(&self, total_ticks: usize) -> usize {
        let growth = total_ticks.checked_div(self.ticks_per_step).unwrap_or(0);
        let limit = self.base.saturating_add(growth);
        match self.ceiling {
            Some(ceiling) => limit.min(ceiling.max(self.base)),
            None => limit,
        }
    }
}

impl From<&DetectorParameters> for PatienceSchedule {
    fn from(params: &DetectorParameters) -> Self {
        Self {
            base: params.base_patience,
            ticks_per_step: params.ticks_per_patience_step,
            ceiling: params.patience_ceiling,
        }
    }
}

/// Advisory polling delay as a non-decreasing function of stagnant ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    pub base_ms: u64,
    pub step_ms: u64,
    pub max_ms: u64,
}

impl BackoffSchedule {
    pub fn new(base_ms: u64, step_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            step_ms,
            max_ms,
        }
    }

    /// `min(max, base + stagnant_count * step)`
    pub fn delay_for(&self, stagnant_count: usize) -> u64 {
        let steps = u64::try_from(stagnant_count).unwrap_or(u64::MAX);
        self.base_ms
            .saturating_add(steps.saturating_mul(self.step_ms))
            .min(self.max_ms)
    }
}

impl From<&DetectorParameters> for BackoffSchedule {
    fn from(params: &DetectorParameters) -> Self {
        Self::new(params.base_delay_ms, params.step_delay_ms, params.max_delay_ms)
    }
}
