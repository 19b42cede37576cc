//! Multi-symbol scoring run: validate, window, score, upsert, rank.
//!
//! A bad request for one symbol is logged and counted, never fatal to the run.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

use crate::anomaly::{AnomalyResult, AnomalyScorer};
use crate::error::{Error, Result};
use crate::ledger::{AnomalyLedger, Upsert};
use crate::models::ScoreRequest;
use crate::scoring::RiskLevel;
use crate::window::select_window;

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub symbol: String,
    pub risk_level: RiskLevel,
    pub insider_probability: f64,
    pub unusual_activity_score: f64,
    pub notes: String,
}

impl Alert {
    fn from_result(r: &AnomalyResult) -> Self {
        Self {
            symbol: r.symbol.clone(),
            risk_level: r.risk_level(),
            insider_probability: r.insider_probability,
            unusual_activity_score: r.unusual_activity_score,
            notes: r.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub errors: usize,
    pub results: Vec<AnomalyResult>,
    pub alerts: Vec<Alert>,
}

pub fn validate_request(req: &ScoreRequest) -> Result<()> {
    if req.symbol.trim().is_empty() {
        return Err(Error::InvalidInput {
            symbol: req.symbol.clone(),
            reason: "empty symbol".into(),
        });
    }
    if !(req.stock_price.is_finite() && req.stock_price > 0.0) {
        return Err(Error::InvalidInput {
            symbol: req.symbol.clone(),
            reason: format!("stock price must be positive, got {}", req.stock_price),
        });
    }
    Ok(())
}

/// Triggered results, highest insider probability first.
pub fn rank_alerts<'a, I>(results: I) -> Vec<Alert>
where
    I: IntoIterator<Item = &'a AnomalyResult>,
{
    let mut flagged: Vec<&AnomalyResult> =
        results.into_iter().filter(|r| r.has_trigger()).collect();
    flagged.sort_by(|a, b| {
        b.insider_probability
            .partial_cmp(&a.insider_probability)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.unusual_activity_score
                    .partial_cmp(&a.unusual_activity_score)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    flagged.into_iter().map(Alert::from_result).collect()
}

pub fn run_batch(scorer: &AnomalyScorer, requests: &[ScoreRequest]) -> BatchReport {
    info!(symbols = requests.len(), "starting anomaly scoring run");
    let lookback = scorer.config().lookback_days;
    let mut ledger = AnomalyLedger::new();
    let mut processed = 0;
    let mut errors = 0;

    for req in requests {
        if let Err(e) = validate_request(req) {
            warn!(symbol = %req.symbol, error = %e, "skipping symbol");
            errors += 1;
            continue;
        }

        let windowed = ScoreRequest {
            symbol: req.symbol.clone(),
            snapshot_date: req.snapshot_date,
            stock_price: req.stock_price,
            options: req.options.clone(),
            historical: select_window(&req.historical, req.snapshot_date, lookback),
        };
        let result = scorer.score(&windowed);
        debug!(
            symbol = %result.symbol,
            history_rows = windowed.historical.len(),
            triggered = result.has_trigger(),
            "symbol scored"
        );
        if ledger.upsert(result) == Upsert::Updated {
            debug!(symbol = %req.symbol, date = %req.snapshot_date, "replaced earlier result");
        }
        processed += 1;
    }

    let alerts = rank_alerts(ledger.iter());
    info!(processed, errors, alerts = alerts.len(), "anomaly scoring run complete");
    BatchReport {
        processed,
        errors,
        results: ledger.into_results(),
        alerts,
    }
}

/// Like [`run_batch`], but decodes each request on its own so a malformed
/// payload for one symbol is counted as an error instead of failing the run.
pub fn run_batch_json(scorer: &AnomalyScorer, raw: &[serde_json::Value]) -> BatchReport {
    let mut rejected = 0;
    let mut requests = Vec::with_capacity(raw.len());
    for (idx, value) in raw.iter().enumerate() {
        match ScoreRequest::deserialize(value) {
            Ok(req) => requests.push(req),
            Err(e) => {
                let symbol = value.get("symbol").and_then(|s| s.as_str()).unwrap_or("?");
                warn!(idx, symbol, error = %e, "skipping undecodable request");
                rejected += 1;
            }
        }
    }
    let mut report = run_batch(scorer, &requests);
    report.errors += rejected;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoricalOption, OptionContract, OptionSide};
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn call(volume: u64) -> OptionContract {
        OptionContract {
            expiration: today() + Duration::days(35),
            strike: 100.0,
            option_type: OptionSide::Call,
            volume,
            open_interest: 0,
            implied_volatility: None,
        }
    }

    /// One call row per day going back `days`, each with `volume`.
    fn history(days: i64, volume: u64) -> Vec<HistoricalOption> {
        (1..=days)
            .map(|d| HistoricalOption::from_contract(today() - Duration::days(d), &call(volume)))
            .collect()
    }

    fn request(
        symbol: &str,
        price: f64,
        today_volume: u64,
        hist: Vec<HistoricalOption>,
    ) -> ScoreRequest {
        ScoreRequest {
            symbol: symbol.to_string(),
            snapshot_date: today(),
            stock_price: price,
            options: vec![call(today_volume)],
            historical: hist,
        }
    }

    #[test]
    fn test_bad_symbol_is_skipped_not_fatal() {
        let reqs = vec![
            request("AAA", 100.0, 500, history(7, 100)),
            request("BBB", f64::NAN, 500, history(7, 100)),
            request("", 100.0, 500, history(7, 100)),
            request("CCC", 100.0, 100, history(7, 100)),
        ];
        let report = run_batch(&AnomalyScorer::default(), &reqs);
        assert_eq!(report.processed, 2);
        assert_eq!(report.errors, 2);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].symbol, "AAA");
    }

    #[test]
    fn test_history_outside_lookback_is_ignored() {
        // rows 15+ days back fall outside the default 14-day window
        let mut hist = history(14, 100);
        hist.extend((15..=30).map(|d| {
            HistoricalOption::from_contract(today() - Duration::days(d), &call(10_000))
        }));
        hist.push(HistoricalOption::from_contract(today(), &call(10_000)));

        let report = run_batch(&AnomalyScorer::default(), &[request("AAA", 100.0, 400, hist)]);
        let r = &report.results[0];
        assert_eq!(r.call_volume_baseline, 100.0);
        assert_eq!(r.call_volume_ratio, 4.0);
    }

    #[test]
    fn test_duplicate_key_keeps_latest() {
        let reqs = vec![
            request("AAA", 100.0, 500, history(7, 100)),
            request("AAA", 100.0, 100, history(7, 100)),
        ];
        let report = run_batch(&AnomalyScorer::default(), &reqs);
        assert_eq!(report.processed, 2);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].call_volume, 100);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn test_json_batch_skips_only_the_malformed_symbol() {
        let good = serde_json::to_value(request("AAA", 100.0, 500, history(7, 100))).unwrap();
        let mut bad = serde_json::to_value(request("BAD", 100.0, 500, history(7, 100))).unwrap();
        bad["options"][0]["expiration"] = serde_json::json!("not-a-date");
        let mut nulls = serde_json::to_value(request("NUL", 100.0, 500, history(7, 100))).unwrap();
        nulls["options"][0]["open_interest"] = serde_json::Value::Null;
        nulls["historical"][0]["volume"] = serde_json::Value::Null;
        nulls["historical"][1]["option_type"] = serde_json::json!("WARRANT");

        let report = run_batch_json(&AnomalyScorer::default(), &[good, bad, nulls]);
        assert_eq!(report.processed, 2);
        assert_eq!(report.errors, 1);
        let symbols: Vec<_> = report.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAA", "NUL"]);
        // the null-volume row reads as 0 and is trimmed; the WARRANT row is ignored
        assert_eq!(report.results[1].call_volume_baseline, 100.0);
    }

    #[test]
    fn test_alerts_ranked_by_insider_probability() {
        let reqs = vec![
            // 400 / 100 = 4x: 0.4 * 1.333 + 0.2
            request("LOW", 100.0, 400, history(7, 100)),
            // 600 / 100 = 6x: 0.4 * 2 + 0.2 = 1.0
            request("HIGH", 100.0, 600, history(7, 100)),
        ];
        let report = run_batch(&AnomalyScorer::default(), &reqs);
        let order: Vec<_> = report.alerts.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(order, ["HIGH", "LOW"]);
        assert_eq!(report.alerts[0].risk_level, RiskLevel::High);
        assert_eq!(report.alerts[1].risk_level, RiskLevel::High);
    }
}
