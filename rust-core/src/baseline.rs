//! Expected per-dimension values derived from the historical window.
//!
//! Every calculator returns `0.0` when it has nothing to work with, which
//! downstream makes the ratio `0` and keeps the dimension from triggering.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::trace;

use crate::detectors::signed_oi;
use crate::models::{HistoricalOption, OptionSide};
use crate::stats;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Baselines {
    pub call_volume: f64,
    pub put_volume: f64,
    pub short_term_call: f64,
    pub otm_call: f64,
    pub call_oi_delta: f64,
}

impl Baselines {
    /// `short_term_cutoff` and `otm_strike` are anchored on the day being
    /// scored and applied unchanged to every historical row.
    pub fn compute(
        history: &[HistoricalOption],
        min_data_points: usize,
        short_term_cutoff: NaiveDate,
        otm_strike: f64,
    ) -> Self {
        let b = Self {
            call_volume: volume_baseline(history, OptionSide::Call, min_data_points),
            put_volume: volume_baseline(history, OptionSide::Put, min_data_points),
            short_term_call: short_term_baseline(
                history,
                OptionSide::Call,
                short_term_cutoff,
            ),
            otm_call: otm_baseline(history, otm_strike),
            call_oi_delta: oi_baseline(history),
        };
        trace!(rows = history.len(), ?b, "baselines computed");
        b
    }
}

/// IQR-trimmed median of per-contract volume for one side.
pub fn volume_baseline(
    history: &[HistoricalOption],
    side: OptionSide,
    min_data_points: usize,
) -> f64 {
    let volumes: Vec<f64> = history
        .iter()
        .filter(|r| r.option_type == side)
        .map(|r| r.volume as f64)
        .collect();
    if volumes.is_empty() || volumes.len() < min_data_points {
        return 0.0;
    }

    let kept = stats::iqr_filter(&volumes);
    let sample = if kept.is_empty() { &volumes } else { &kept };
    stats::median(sample).unwrap_or(0.0)
}

/// Mean volume of rows on `side` expiring on or before `cutoff`.
pub fn short_term_baseline(
    history: &[HistoricalOption],
    side: OptionSide,
    cutoff: NaiveDate,
) -> f64 {
    let volumes: Vec<f64> = history
        .iter()
        .filter(|r| r.option_type == side && r.expiration <= cutoff)
        .map(|r| r.volume as f64)
        .collect();
    stats::mean(&volumes).unwrap_or(0.0)
}

/// Mean volume of calls struck above `otm_strike`.
pub fn otm_baseline(history: &[HistoricalOption], otm_strike: f64) -> f64 {
    let volumes: Vec<f64> = history
        .iter()
        .filter(|r| r.option_type == OptionSide::Call && r.strike > otm_strike)
        .map(|r| r.volume as f64)
        .collect();
    stats::mean(&volumes).unwrap_or(0.0)
}

/// Mean over snapshot dates of (total call OI - total put OI).
pub fn oi_baseline(history: &[HistoricalOption]) -> f64 {
    let mut by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for r in history {
        let oi = signed_oi(r.open_interest);
        let delta = by_date.entry(r.snapshot_date).or_insert(0);
        match r.option_type {
            OptionSide::Call => *delta = delta.saturating_add(oi),
            OptionSide::Put => *delta = delta.saturating_sub(oi),
            OptionSide::Other => {}
        }
    }
    let deltas: Vec<f64> = by_date.values().map(|d| *d as f64).collect();
    stats::mean(&deltas).unwrap_or(0.0)
}
