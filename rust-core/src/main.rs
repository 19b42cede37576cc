//! CLI: stdin JSON -> stdout JSON. Called by the daily tracker once options are stored.
//!
//! Usage:
//!   echo '{"symbol":"AAPL","snapshot_date":"2024-03-15","stock_price":172.6,
//!          "options":[...],"historical":[...]}' | options-anomaly score
//!   echo '{"config":{...},"requests":[...]}' | options-anomaly batch
//!
//! Without a `config` object, thresholds come from the environment
//! (`VOLUME_THRESHOLD`, `OI_THRESHOLD`, ...). Logs go to stderr.
use options_anomaly_core::{run_batch_json, AnomalyScorer, Result, ScoreRequest, ScorerConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::{self, Write};
use tracing::info;

#[derive(Debug, Deserialize)]
struct ScoreInput {
    #[serde(default)]
    config: Option<ScorerConfig>,
    #[serde(flatten)]
    request: ScoreRequest,
}

#[derive(Debug, Deserialize)]
struct BatchInput {
    #[serde(default)]
    config: Option<ScorerConfig>,
    requests: Vec<serde_json::Value>,
}

fn scorer_for(config: Option<ScorerConfig>) -> Result<AnomalyScorer> {
    let config = match config {
        Some(c) => c,
        None => ScorerConfig::from_env()?,
    };
    AnomalyScorer::new(config)
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args: Vec<String> = env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("batch");

    match cmd {
        "score" => {
            let input: ScoreInput = serde_json::from_reader(io::stdin())?;
            let scorer = scorer_for(input.config)?;
            let result = scorer.score(&input.request);
            info!(symbol = %result.symbol, triggered = result.has_trigger(), "scored");
            emit(&result)?;
        }
        _ => {
            let input: BatchInput = serde_json::from_reader(io::stdin())?;
            let scorer = scorer_for(input.config)?;
            let report = run_batch_json(&scorer, &input.requests);
            emit(&report)?;
        }
    }
    Ok(())
}
