use chrono::{Duration, NaiveDate};

use crate::models::HistoricalOption;

/// Rows with `target - lookback_days <= snapshot_date < target`.
pub fn select_window(
    rows: &[HistoricalOption],
    target: NaiveDate,
    lookback_days: u32,
) -> Vec<HistoricalOption> {
    let start = target - Duration::days(i64::from(lookback_days));
    rows.iter()
        .filter(|r| r.snapshot_date >= start && r.snapshot_date < target)
        .cloned()
        .collect()
}
