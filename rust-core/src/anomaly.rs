//! Baseline-ratio anomaly scoring for a single symbol's option chain.
//! Pure and synchronous: no I/O, no shared state, safe to call from any thread.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::Baselines;
use crate::config::ScorerConfig;
use crate::detectors::{self, Reading};
use crate::error::Result;
use crate::models::ScoreRequest;
use crate::scoring::{self, Dimension, RiskLevel, Signal, NO_DATA_NOTE};

/// One row per (symbol, snapshot_date); field names match the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub symbol: String,
    pub snapshot_date: NaiveDate,

    pub call_volume: u64,
    pub call_volume_baseline: f64,
    pub call_volume_ratio: f64,
    pub call_volume_trigger: bool,

    pub put_volume: u64,
    pub put_volume_baseline: f64,
    pub put_volume_ratio: f64,
    pub put_volume_trigger: bool,

    pub short_term_call_volume: u64,
    pub short_term_call_baseline: f64,
    pub short_term_call_ratio: f64,
    pub short_term_call_trigger: bool,

    pub otm_call_volume: u64,
    pub otm_call_baseline: f64,
    pub otm_call_ratio: f64,
    pub otm_call_trigger: bool,

    pub call_oi_delta: i64,
    pub call_oi_baseline: f64,
    pub call_oi_ratio: f64,
    pub call_oi_trigger: bool,

    pub unusual_activity_score: f64,
    pub insider_probability: f64,
    pub notes: String,
}

impl AnomalyResult {
    fn empty(symbol: &str, snapshot_date: NaiveDate) -> Self {
        let vol = Reading::<u64>::zero();
        let oi = Reading::<i64>::zero();
        let mut r = Self::assemble(symbol, snapshot_date, [vol; 4], oi);
        r.notes = NO_DATA_NOTE.to_string();
        r
    }

    fn assemble(
        symbol: &str,
        snapshot_date: NaiveDate,
        [call, put, short_term, otm]: [Reading<u64>; 4],
        oi: Reading<i64>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            snapshot_date,
            call_volume: call.value,
            call_volume_baseline: call.baseline,
            call_volume_ratio: call.ratio,
            call_volume_trigger: call.triggered,
            put_volume: put.value,
            put_volume_baseline: put.baseline,
            put_volume_ratio: put.ratio,
            put_volume_trigger: put.triggered,
            short_term_call_volume: short_term.value,
            short_term_call_baseline: short_term.baseline,
            short_term_call_ratio: short_term.ratio,
            short_term_call_trigger: short_term.triggered,
            otm_call_volume: otm.value,
            otm_call_baseline: otm.baseline,
            otm_call_ratio: otm.ratio,
            otm_call_trigger: otm.triggered,
            call_oi_delta: oi.value,
            call_oi_baseline: oi.baseline,
            call_oi_ratio: oi.ratio,
            call_oi_trigger: oi.triggered,
            unusual_activity_score: 0.0,
            insider_probability: 0.0,
            notes: String::new(),
        }
    }

    /// The five dimensions in reporting order.
    pub fn signals(&self) -> [Signal; 5] {
        [
            Signal {
                dimension: Dimension::CallVolume,
                ratio: self.call_volume_ratio,
                triggered: self.call_volume_trigger,
            },
            Signal {
                dimension: Dimension::PutVolume,
                ratio: self.put_volume_ratio,
                triggered: self.put_volume_trigger,
            },
            Signal {
                dimension: Dimension::ShortTermCall,
                ratio: self.short_term_call_ratio,
                triggered: self.short_term_call_trigger,
            },
            Signal {
                dimension: Dimension::OtmCall,
                ratio: self.otm_call_ratio,
                triggered: self.otm_call_trigger,
            },
            Signal {
                dimension: Dimension::CallOpenInterest,
                ratio: self.call_oi_ratio,
                triggered: self.call_oi_trigger,
            },
        ]
    }

    pub fn has_trigger(&self) -> bool {
        self.signals().iter().any(|s| s.triggered)
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.insider_probability)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnomalyScorer {
    config: ScorerConfig,
}

impl AnomalyScorer {
    pub fn new(config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Scores `req.options` against baselines built from `req.historical`.
    ///
    /// The caller is responsible for restricting `historical` to the lookback
    /// window (see [`crate::window::select_window`]).
    pub fn score(&self, req: &ScoreRequest) -> AnomalyResult {
        if req.options.is_empty() {
            debug!(symbol = %req.symbol, date = %req.snapshot_date, "no options data");
            return AnomalyResult::empty(&req.symbol, req.snapshot_date);
        }

        let cfg = &self.config;
        let short_term_cutoff = req.snapshot_date + Duration::days(i64::from(cfg.short_term_days));
        let otm_strike = cfg.otm_strike(req.stock_price);
        let base = Baselines::compute(
            &req.historical,
            cfg.min_data_points,
            short_term_cutoff,
            otm_strike,
        );

        let vt = cfg.volume_threshold;
        let volumes = [
            detectors::call_volume(&req.options, base.call_volume, vt),
            detectors::put_volume(&req.options, base.put_volume, vt),
            detectors::short_term_call_volume(
                &req.options,
                short_term_cutoff,
                base.short_term_call,
                vt,
            ),
            detectors::otm_call_volume(&req.options, otm_strike, base.otm_call, vt),
        ];
        let oi = detectors::call_oi_delta(&req.options, base.call_oi_delta, cfg.oi_threshold);

        let mut result = AnomalyResult::assemble(&req.symbol, req.snapshot_date, volumes, oi);
        let signals = result.signals();
        result.unusual_activity_score = scoring::unusual_activity_score(&signals, cfg);
        result.insider_probability = scoring::insider_probability(&signals, cfg);
        result.notes = scoring::notes(&signals);

        debug!(
            symbol = %result.symbol,
            date = %result.snapshot_date,
            activity = result.unusual_activity_score,
            insider = result.insider_probability,
            "scored"
        );
        result
    }
}
