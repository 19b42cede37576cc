//! Options anomaly core: baseline-ratio scoring of daily option-chain activity.
//! Pure computation; fetching, storage and delivery live with the caller.

mod anomaly;
mod baseline;
mod batch;
mod config;
mod detectors;
mod error;
mod ledger;
mod models;
mod scoring;
mod stats;
mod window;

pub use anomaly::{AnomalyResult, AnomalyScorer};
pub use baseline::Baselines;
pub use batch::{rank_alerts, run_batch, run_batch_json, validate_request, Alert, BatchReport};
pub use config::ScorerConfig;
pub use detectors::{guarded_ratio, Reading};
pub use error::{Error, Result};
pub use ledger::{AnomalyLedger, Upsert};
pub use models::{HistoricalOption, OptionContract, OptionSide, ScoreRequest};
pub use scoring::{Dimension, RiskLevel, Signal, NO_ANOMALIES_NOTE, NO_DATA_NOTE};
pub use window::select_window;
