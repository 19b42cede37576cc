//! Composite scores rolled up from the five dimension readings.
//!
//! Neither number is a calibrated probability. Both exist to rank symbols
//! for alerting.

use serde::{Deserialize, Serialize};

use crate::config::ScorerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    CallVolume,
    PutVolume,
    ShortTermCall,
    OtmCall,
    CallOpenInterest,
}

impl Dimension {
    pub fn threshold(self, config: &ScorerConfig) -> f64 {
        match self {
            Dimension::CallOpenInterest => config.oi_threshold,
            _ => config.volume_threshold,
        }
    }

    /// Multiplier on the capped severity in the weighted stage.
    fn weight(self) -> f64 {
        match self {
            Dimension::CallVolume | Dimension::PutVolume => 0.4,
            Dimension::CallOpenInterest => 0.3,
            Dimension::ShortTermCall => 0.2,
            Dimension::OtmCall => 0.1,
        }
    }

    /// Flat increment added after the weighted stage is clamped.
    fn bonus(self) -> f64 {
        match self {
            Dimension::CallVolume | Dimension::PutVolume => 0.2,
            Dimension::ShortTermCall => 0.3,
            Dimension::OtmCall => 0.4,
            Dimension::CallOpenInterest => 0.1,
        }
    }

    fn note(self, ratio: f64) -> String {
        match self {
            Dimension::CallVolume => format!("Call volume {ratio:.1}x normal"),
            Dimension::PutVolume => format!("Put volume {ratio:.1}x normal"),
            Dimension::ShortTermCall => format!("Short-term call volume {ratio:.1}x normal"),
            Dimension::OtmCall => format!("OTM call volume {ratio:.1}x normal"),
            Dimension::CallOpenInterest => format!("Unusual OI change: {ratio:.1}x normal"),
        }
    }
}

/// What composite scoring needs from one dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub dimension: Dimension,
    pub ratio: f64,
    pub triggered: bool,
}

pub const NO_ANOMALIES_NOTE: &str = "No significant anomalies detected";
pub const NO_DATA_NOTE: &str = "No options data available";

const ACTIVITY_CAP: f64 = 3.0;
const WEIGHTED_CAP: f64 = 2.0;

fn severity(signal: &Signal, config: &ScorerConfig, cap: f64) -> f64 {
    (signal.ratio / signal.dimension.threshold(config)).min(cap)
}

/// Mean capped severity over triggered dimensions; `0.0` if none triggered.
pub fn unusual_activity_score(signals: &[Signal], config: &ScorerConfig) -> f64 {
    let scores: Vec<f64> = signals
        .iter()
        .filter(|s| s.triggered)
        .map(|s| severity(s, config, ACTIVITY_CAP))
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Weighted severity sum clamped to 1, plus a flat bonus per trigger, clamped again.
///
/// Both stages read the same trigger flags, so each triggered dimension is
/// rewarded twice. Downstream alert ranking depends on these exact values.
pub fn insider_probability(signals: &[Signal], config: &ScorerConfig) -> f64 {
    let triggered = || signals.iter().filter(|s| s.triggered);

    // stage order matters for bit-identical sums: volume, OI, short-term, OTM
    let weighted_order = [
        Dimension::CallVolume,
        Dimension::PutVolume,
        Dimension::CallOpenInterest,
        Dimension::ShortTermCall,
        Dimension::OtmCall,
    ];
    let mut score = 0.0;
    for dim in weighted_order {
        for s in triggered().filter(|s| s.dimension == dim) {
            score += dim.weight() * severity(s, config, WEIGHTED_CAP);
        }
    }

    let mut probability = score.min(1.0);
    for s in triggered() {
        probability += s.dimension.bonus();
    }
    probability.clamp(0.0, 1.0)
}

/// One clause per triggered dimension joined by `"; "`.
pub fn notes(signals: &[Signal]) -> String {
    let clauses: Vec<String> = signals
        .iter()
        .filter(|s| s.triggered)
        .map(|s| s.dimension.note(s.ratio))
        .collect();
    if clauses.is_empty() {
        NO_ANOMALIES_NOTE.to_string()
    } else {
        clauses.join("; ")
    }
}

/// Alert tier used when prioritising notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.7 {
            RiskLevel::High
        } else if p >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Dimension; 5] = [
        Dimension::CallVolume,
        Dimension::PutVolume,
        Dimension::ShortTermCall,
        Dimension::OtmCall,
        Dimension::CallOpenInterest,
    ];

    fn signal(dimension: Dimension, ratio: f64, config: &ScorerConfig) -> Signal {
        Signal {
            dimension,
            ratio,
            triggered: ratio > dimension.threshold(config),
        }
    }

    fn at_multiple(multiple: f64, config: &ScorerConfig) -> Vec<Signal> {
        ALL.iter()
            .map(|d| signal(*d, d.threshold(config) * multiple, config))
            .collect()
    }

    #[test]
    fn test_nothing_triggered() {
        let c = ScorerConfig::default();
        let signals = at_multiple(0.5, &c);
        assert_eq!(unusual_activity_score(&signals, &c), 0.0);
        assert_eq!(insider_probability(&signals, &c), 0.0);
        assert_eq!(notes(&signals), NO_ANOMALIES_NOTE);
    }

    #[test]
    fn test_all_at_double_threshold() {
        let c = ScorerConfig::default();
        let signals = at_multiple(2.0, &c);
        assert!(signals.iter().all(|s| s.triggered));
        assert_eq!(unusual_activity_score(&signals, &c), 2.0);
        // stage 1: 0.4*2 + 0.4*2 + 0.3*2 + 0.2*2 + 0.1*2 = 2.8 -> 1.0
        // stage 2: 1.0 + 0.2 + 0.2 + 0.3 + 0.4 + 0.1 = 2.2 -> 1.0
        assert_eq!(insider_probability(&signals, &c), 1.0);
    }

    #[test]
    fn test_activity_score_caps_each_dimension() {
        let c = ScorerConfig::default();
        let signals = vec![
            signal(Dimension::CallVolume, 30.0, &c),
            signal(Dimension::PutVolume, 6.0, &c),
        ];
        // min(10, 3) and min(2, 3)
        assert_eq!(unusual_activity_score(&signals, &c), 2.5);
    }

    #[test]
    fn test_insider_probability_double_counts_triggers() {
        // Known quirk: a lone OTM trigger scores its weight and its bonus.
        let c = ScorerConfig::default();
        let signals = vec![
            signal(Dimension::CallVolume, 1.0, &c),
            signal(Dimension::OtmCall, 6.0, &c),
        ];
        let p = insider_probability(&signals, &c);
        assert!((p - (0.1 * 2.0 + 0.4)).abs() < 1e-12);
    }

    #[test]
    fn test_insider_probability_oi_only() {
        let c = ScorerConfig::default();
        let signals = vec![signal(Dimension::CallOpenInterest, 3.0, &c)];
        // 0.3 * (3.0 / 2.5) + 0.1
        let p = insider_probability(&signals, &c);
        assert!((p - 0.46).abs() < 1e-12);
        assert_eq!(RiskLevel::from_probability(p), RiskLevel::Medium);
    }

    #[test]
    fn test_notes_format() {
        let c = ScorerConfig::default();
        let signals = vec![
            signal(Dimension::CallVolume, 4.2, &c),
            signal(Dimension::PutVolume, 1.0, &c),
            signal(Dimension::CallOpenInterest, 3.0, &c),
        ];
        assert_eq!(
            notes(&signals),
            "Call volume 4.2x normal; Unusual OI change: 3.0x normal"
        );
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
    }
}
