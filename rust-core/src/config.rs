//! Scorer thresholds and window sizes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Volume-family ratio above which a dimension triggers.
    pub volume_threshold: f64,
    /// Open-interest ratio above which the OI dimension triggers.
    pub oi_threshold: f64,
    /// Expirations within this many days of the snapshot count as short-term.
    pub short_term_days: u32,
    /// Calls struck more than this percentage above spot count as OTM.
    pub otm_percentage: f64,
    /// Historical rows required before a volume baseline is trusted.
    pub min_data_points: usize,
    /// Calendar days of history preceding the snapshot used for baselines.
    pub lookback_days: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            volume_threshold: 3.0,
            oi_threshold: 2.5,
            short_term_days: 7,
            otm_percentage: 10.0,
            min_data_points: 5,
            lookback_days: 14,
        }
    }
}

impl ScorerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.volume_threshold.is_finite() && self.volume_threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "volume_threshold must be positive, got {}",
                self.volume_threshold
            )));
        }
        if !(self.oi_threshold.is_finite() && self.oi_threshold > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "oi_threshold must be positive, got {}",
                self.oi_threshold
            )));
        }
        if !(self.otm_percentage.is_finite() && self.otm_percentage >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "otm_percentage must be non-negative, got {}",
                self.otm_percentage
            )));
        }
        if self.min_data_points == 0 {
            return Err(Error::InvalidConfig("min_data_points must be at least 1".into()));
        }
        if self.lookback_days == 0 {
            return Err(Error::InvalidConfig("lookback_days must be at least 1".into()));
        }
        Ok(())
    }

    /// Strike above which a call is out of the money for the given spot.
    pub fn otm_strike(&self, stock_price: f64) -> f64 {
        stock_price * (1.0 + self.otm_percentage / 100.0)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, keeping defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let config = Self {
            volume_threshold: read(&lookup, "VOLUME_THRESHOLD", d.volume_threshold)?,
            oi_threshold: read(&lookup, "OI_THRESHOLD", d.oi_threshold)?,
            short_term_days: read(&lookup, "SHORT_TERM_DAYS", d.short_term_days)?,
            otm_percentage: read(&lookup, "OTM_PERCENTAGE", d.otm_percentage)?,
            min_data_points: read(&lookup, "MIN_DATA_POINTS", d.min_data_points)?,
            lookback_days: read(&lookup, "LOOKBACK_DAYS", d.lookback_days)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn read<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| Error::InvalidEnv {
            key: key.to_string(),
            value: raw,
        }),
    }
}
