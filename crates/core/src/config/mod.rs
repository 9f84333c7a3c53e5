use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CueSyncError, Result};

/// Unit in which the transport reports round-trip latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl LatencyUnit {
    pub fn to_seconds(self, value: f64) -> f64 {
        match self {
            Self::Seconds => value,
            Self::Milliseconds => value / 1000.0,
        }
    }
}

/// Top-level configuration of the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub latency_unit: LatencyUnit,
    /// Fraction of the round-trip latency added to extrapolated positions.
    pub latency_compensation: f64,
    /// Upper bound for reported latencies, in `latency_unit`.
    pub max_latency: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            latency_unit: LatencyUnit::Seconds,
            latency_compensation: 0.5,
            max_latency: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latency_compensation.is_finite()
            || !(0.0..=1.0).contains(&self.latency_compensation)
        {
            return Err(CueSyncError::InvalidConfig(format!(
                "latency_compensation must be within [0, 1], got {}",
                self.latency_compensation
            )));
        }
        if let Some(max) = self.max_latency {
            if !max.is_finite() || max < 0.0 {
                return Err(CueSyncError::InvalidConfig(format!(
                    "max_latency must be a non-negative number, got {max}"
                )));
            }
        }
        Ok(())
    }

    /// Converts a reported round-trip latency into seconds. Garbage in
    /// (negative, NaN, infinite) becomes zero.
    pub fn latency_seconds(&self, reported: f64) -> f64 {
        if !reported.is_finite() || reported < 0.0 {
            return 0.0;
        }
        let bounded = match self.max_latency {
            Some(max) => reported.min(max),
            None => reported,
        };
        self.latency_unit.to_seconds(bounded)
    }
}
