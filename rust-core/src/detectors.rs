//! Per-dimension comparison of today's chain against its baseline.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{OptionContract, OptionSide};

/// Observed value, its baseline, the guarded ratio and whether it tripped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading<T> {
    pub value: T,
    pub baseline: f64,
    pub ratio: f64,
    pub triggered: bool,
}

impl<T: Default> Reading<T> {
    pub fn zero() -> Self {
        Self {
            value: T::default(),
            baseline: 0.0,
            ratio: 0.0,
            triggered: false,
        }
    }
}

/// `value / baseline`, or `0.0` when the baseline is not a usable divisor.
pub fn guarded_ratio(value: f64, baseline: f64) -> f64 {
    if baseline > 0.0 && baseline.is_finite() {
        value / baseline
    } else {
        0.0
    }
}

fn volume_reading(value: u64, baseline: f64, threshold: f64) -> Reading<u64> {
    let ratio = guarded_ratio(value as f64, baseline);
    Reading {
        value,
        baseline,
        ratio,
        triggered: ratio > threshold,
    }
}

fn side_volume<'a, I>(contracts: I, side: OptionSide) -> u64
where
    I: IntoIterator<Item = &'a OptionContract>,
{
    contracts
        .into_iter()
        .filter(|c| c.option_type == side)
        .fold(0u64, |acc, c| acc.saturating_add(c.volume))
}

/// Open interest as a signed count, pinned at `i64::MAX`.
pub(crate) fn signed_oi(open_interest: u64) -> i64 {
    i64::try_from(open_interest).unwrap_or(i64::MAX)
}

pub fn call_volume(options: &[OptionContract], baseline: f64, threshold: f64) -> Reading<u64> {
    volume_reading(side_volume(options, OptionSide::Call), baseline, threshold)
}

pub fn put_volume(options: &[OptionContract], baseline: f64, threshold: f64) -> Reading<u64> {
    volume_reading(side_volume(options, OptionSide::Put), baseline, threshold)
}

/// Calls expiring on or before `cutoff`.
pub fn short_term_call_volume(
    options: &[OptionContract],
    cutoff: NaiveDate,
    baseline: f64,
    threshold: f64,
) -> Reading<u64> {
    let volume = side_volume(
        options.iter().filter(|c| c.expiration <= cutoff),
        OptionSide::Call,
    );
    volume_reading(volume, baseline, threshold)
}

/// Calls struck above `otm_strike`.
pub fn otm_call_volume(
    options: &[OptionContract],
    otm_strike: f64,
    baseline: f64,
    threshold: f64,
) -> Reading<u64> {
    let volume = side_volume(
        options.iter().filter(|c| c.strike > otm_strike),
        OptionSide::Call,
    );
    volume_reading(volume, baseline, threshold)
}

/// Call OI minus put OI, compared by magnitude against the baseline delta.
pub fn call_oi_delta(options: &[OptionContract], baseline: f64, threshold: f64) -> Reading<i64> {
    let delta = options.iter().fold(0i64, |acc, o| match o.option_type {
        OptionSide::Call => acc.saturating_add(signed_oi(o.open_interest)),
        OptionSide::Put => acc.saturating_sub(signed_oi(o.open_interest)),
        OptionSide::Other => acc,
    });
    let ratio = guarded_ratio((delta as f64).abs(), baseline.abs());
    Reading {
        value: delta,
        baseline,
        ratio,
        triggered: ratio > threshold,
    }
}
