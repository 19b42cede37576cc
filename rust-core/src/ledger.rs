use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::anomaly::AnomalyResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Latest result per (symbol, snapshot_date), iterated in key order.
#[derive(Debug, Default)]
pub struct AnomalyLedger {
    records: BTreeMap<(String, NaiveDate), AnomalyResult>,
}

impl AnomalyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, result: AnomalyResult) -> Upsert {
        let key = (result.symbol.clone(), result.snapshot_date);
        match self.records.insert(key, result) {
            Some(_) => Upsert::Updated,
            None => Upsert::Inserted,
        }
    }

    pub fn get(&self, symbol: &str, snapshot_date: NaiveDate) -> Option<&AnomalyResult> {
        self.records.get(&(symbol.to_string(), snapshot_date))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnomalyResult> {
        self.records.values()
    }

    pub fn into_results(self) -> Vec<AnomalyResult> {
        self.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalyScorer;
    use crate::models::ScoreRequest;

    fn empty_result(symbol: &str, d: u32) -> AnomalyResult {
        AnomalyScorer::default().score(&ScoreRequest {
            symbol: symbol.to_string(),
            snapshot_date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            stock_price: 10.0,
            options: vec![],
            historical: vec![],
        })
    }

    #[test]
    fn test_upsert_replaces_same_key() {
        let mut ledger = AnomalyLedger::new();
        assert_eq!(ledger.upsert(empty_result("MSFT", 4)), Upsert::Inserted);
        assert_eq!(ledger.upsert(empty_result("AAPL", 4)), Upsert::Inserted);

        let mut again = empty_result("MSFT", 4);
        again.notes = "rescored".to_string();
        assert_eq!(ledger.upsert(again), Upsert::Updated);
        assert_eq!(ledger.len(), 2);

        let d = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(ledger.get("MSFT", d).unwrap().notes, "rescored");

        let symbols: Vec<_> = ledger.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "MSFT"]);
    }
}
