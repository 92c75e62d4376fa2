//! Detector configuration

use serde::{Deserialize, Serialize};
use settle_core::{Error, Result};
use std::fmt;

/// How the first observation of a session is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// The first observation seeds the last size and counts as a stagnant tick
    #[default]
    FirstObservation,

    /// The last size starts at zero, so any initial content counts as growth
    Zero,
}

/// Parameters for stabilization detection
///
/// All delays are in milliseconds. Field names match the JSON accepted by
/// [`DetectorParameters::from_json_str`]; missing fields take their defaults.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParameters {
    /// Growth must exceed this many units to count as progress
    pub min_growth_threshold: u64,

    /// Consecutive stagnant ticks tolerated at the start of a session
    pub base_patience: usize,

    /// Every this many ticks the patience grows by one (0 disables growth)
    pub ticks_per_patience_step: usize,

    /// Optional upper bound on the patience limit
    pub patience_ceiling: Option<usize>,

    /// Advisory delay after a progress tick
    pub base_delay_ms: u64,

    /// Additional delay per consecutive stagnant tick
    pub step_delay_ms: u64,

    /// Ceiling of the advisory delay
    pub max_delay_ms: u64,

    /// Treatment of the first observation
    pub baseline: BaselineMode,
}

impl fmt::Debug for DetectorParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorParameters")
            .field("min_growth_threshold", &self.min_growth_threshold)
            .field("base_patience", &self.base_patience)
            .field("ticks_per_patience_step", &self.ticks_per_patience_step)
            .field("patience_ceiling", &self.patience_ceiling)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("step_delay_ms", &self.step_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("baseline", &self.baseline)
            .finish()
    }
}

impl Default for DetectorParameters {
    fn default() -> Self {
        Self {
            min_growth_threshold: 2,
            base_patience: 5,
            ticks_per_patience_step: 20,
            patience_ceiling: None,
            base_delay_ms: 2_000,
            step_delay_ms: 500,
            max_delay_ms: 8_000,
            baseline: BaselineMode::FirstObservation,
        }
    }
}

impl DetectorParameters {
    /// Parameters demanding more evidence before declaring the end of a feed
    ///
    /// Suited to slow hosts where loads regularly stall for several ticks.
    pub fn strict() -> Self {
        Self {
            min_growth_threshold: 1,
            base_patience: 7,
            ticks_per_patience_step: 15,
            patience_ceiling: Some(20),
            base_delay_ms: 3_000,
            step_delay_ms: 1_000,
            max_delay_ms: 15_000,
            baseline: BaselineMode::FirstObservation,
        }
    }

    /// Parameters that give up quickly on short feeds
    pub fn relaxed() -> Self {
        Self {
            min_growth_threshold: 3,
            base_patience: 3,
            ticks_per_patience_step: 40,
            patience_ceiling: Some(6),
            base_delay_ms: 1_000,
            step_delay_ms: 250,
            max_delay_ms: 3_000,
            baseline: BaselineMode::FirstObservation,
        }
    }

    /// Parameters for very long sessions with a fixed number of stagnant checks
    pub fn fixed(patience: usize) -> Self {
        Self {
            base_patience: patience,
            ticks_per_patience_step: 0,
            ..Self::default()
        }
    }

    pub fn with_min_growth_threshold(mut self, threshold: u64) -> Self {
        self.min_growth_threshold = threshold;
        self
    }

    pub fn with_patience(mut self, base_patience: usize, ticks_per_step: usize) -> Self {
        self.base_patience = base_patience;
        self.ticks_per_patience_step = ticks_per_step;
        self
    }

    pub fn with_patience_ceiling(mut self, ceiling: usize) -> Self {
        self.patience_ceiling = Some(ceiling);
        self
    }

    pub fn with_delays(mut self, base_ms: u64, step_ms: u64, max_ms: u64) -> Self {
        self.base_delay_ms = base_ms;
        self.step_delay_ms = step_ms;
        self.max_delay_ms = max_ms;
        self
    }

    pub fn with_baseline(mut self, baseline: BaselineMode) -> Self {
        self.baseline = baseline;
        self
    }

    /// Check that the parameters describe a usable detector
    pub fn validate(&self) -> Result<()> {
        if self.base_patience == 0 {
            return Err(Error::non_positive("base_patience"));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::inverted_bounds("base_delay_ms", "max_delay_ms"));
        }
        if let Some(ceiling) = self.patience_ceiling {
            if ceiling < self.base_patience {
                return Err(Error::inverted_bounds("base_patience", "patience_ceiling"));
            }
        }
        Ok(())
    }

    /// Repair invalid combinations instead of rejecting them
    pub fn sanitized(mut self) -> Self {
        self.base_patience = self.base_patience.max(1);
        self.max_delay_ms = self.max_delay_ms.max(self.base_delay_ms);
        if let Some(ceiling) = self.patience_ceiling {
            self.patience_ceiling = Some(ceiling.max(self.base_patience));
        }
        self
    }

    /// Parse and validate parameters from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize parameters to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for params in [
            DetectorParameters::default(),
            DetectorParameters::strict(),
            DetectorParameters::relaxed(),
            DetectorParameters::fixed(7),
        ] {
            assert!(params.validate().is_ok(), "{params:?} should validate");
        }
    }

    #[test]
    fn test_validate_rejects_zero_patience() {
        let params = DetectorParameters::default().with_patience(0, 20);
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("base_patience"));
    }

    #[test]
    fn test_validate_rejects_inverted_delays() {
        let params = DetectorParameters::default().with_delays(5_000, 100, 1_000);
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("max_delay_ms"));
    }

    #[test]
    fn test_validate_rejects_low_ceiling() {
        let params = DetectorParameters::default()
            .with_patience(5, 20)
            .with_patience_ceiling(3);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_sanitized_repairs() {
        let params = DetectorParameters::default()
            .with_patience(0, 10)
            .with_delays(5_000, 100, 1_000)
            .with_patience_ceiling(0)
            .sanitized();
        assert_eq!(params.base_patience, 1);
        assert_eq!(params.max_delay_ms, 5_000);
        assert_eq!(params.patience_ceiling, Some(1));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_json_partial_config() {
        let params = DetectorParameters::from_json_str(
            r#"{ "base_patience": 7, "baseline": "zero" }"#,
        )
        .unwrap();
        assert_eq!(params.base_patience, 7);
        assert_eq!(params.baseline, BaselineMode::Zero);
        assert_eq!(params.min_growth_threshold, 2);
        assert_eq!(params.ticks_per_patience_step, 20);
    }

    #[test]
    fn test_json_rejects_invalid() {
        let err = DetectorParameters::from_json_str(r#"{ "base_patience": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = DetectorParameters::from_json_str("not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_preset() {
        let strict = DetectorParameters::strict();
        let json = strict.to_json_string().unwrap();
        assert_eq!(DetectorParameters::from_json_str(&json).unwrap(), strict);
    }
}
