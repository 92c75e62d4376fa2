//! Session configuration

use serde::{Deserialize, Serialize};
use settle_core::{Error, Result};
use settle_detector::DetectorParameters;

/// Configuration of a [`ScrollSession`](crate::ScrollSession)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Parameters of the stabilization detector
    pub detector: DetectorParameters,

    /// Hard upper bound on polls per phase, failed polls included
    pub max_ticks_per_phase: Option<usize>,

    /// Consecutive source failures tolerated before the phase fails
    pub max_consecutive_failures: usize,

    /// Delay after a failed measurement; defaults to the detector's delay ceiling
    pub failure_delay_ms: Option<u64>,

    /// Keep the per-tick measurement trace in phase summaries
    pub keep_history: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            detector: DetectorParameters::default(),
            max_ticks_per_phase: None,
            max_consecutive_failures: 3,
            failure_delay_ms: None,
            keep_history: false,
        }
    }
}

impl SessionConfig {
    pub fn new(detector: DetectorParameters) -> Self {
        Self {
            detector,
            ..Self::default()
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks_per_phase = Some(max_ticks);
        self
    }

    pub fn with_max_consecutive_failures(mut self, failures: usize) -> Self {
        self.max_consecutive_failures = failures;
        self
    }

    pub fn with_failure_delay_ms(mut self, delay_ms: u64) -> Self {
        self.failure_delay_ms = Some(delay_ms);
        self
    }

    pub fn with_history(mut self) -> Self {
        self.keep_history = true;
        self
    }

    /// Delay applied after a failed measurement
    pub fn failure_delay(&self) -> u64 {
        self.failure_delay_ms.unwrap_or(self.detector.max_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        if self.max_consecutive_failures == 0 {
            return Err(Error::non_positive("max_consecutive_failures"));
        }
        if self.max_ticks_per_phase == Some(0) {
            return Err(Error::non_positive("max_ticks_per_phase"));
        }
        Ok(())
    }

    /// Parse and validate a session configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
