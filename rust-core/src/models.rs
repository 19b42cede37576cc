use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Accepts `YYYY-MM-DD`, ignoring any trailing time component.
pub(crate) fn deserialize_naive_date<'de, D>(d: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    NaiveDate::parse_from_str(s.get(..10).unwrap_or(&s), "%Y-%m-%d")
        .map_err(serde::de::Error::custom)
}

/// Null and non-finite values both read as `None`.
fn deserialize_opt_finite<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<f64> = Option::deserialize(d)?;
    Ok(opt.filter(|v| v.is_finite()))
}

/// Null counts read as 0 so they drop out of sums.
fn deserialize_count<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<u64> = Option::deserialize(d)?;
    Ok(opt.unwrap_or(0))
}

/// Contract side. Anything other than `CALL` or `PUT` reads as `Other`
/// and is left out of every per-side aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionSide {
    Call,
    Put,
    Other,
}

impl<'de> Deserialize<'de> for OptionSide {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(match raw.as_deref() {
            Some("CALL") => OptionSide::Call,
            Some("PUT") => OptionSide::Put,
            _ => OptionSide::Other,
        })
    }
}

/// One contract of a symbol's option chain as observed on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    #[serde(deserialize_with = "deserialize_naive_date")]
    pub expiration: NaiveDate,
    pub strike: f64,
    pub option_type: OptionSide,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub volume: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub open_interest: u64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_opt_finite"
    )]
    pub implied_volatility: Option<f64>,
}

/// A stored contract observation from a previous snapshot day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalOption {
    #[serde(deserialize_with = "deserialize_naive_date")]
    pub snapshot_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_naive_date")]
    pub expiration: NaiveDate,
    pub strike: f64,
    pub option_type: OptionSide,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub volume: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub open_interest: u64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_opt_finite"
    )]
    pub implied_volatility: Option<f64>,
}

impl HistoricalOption {
    pub fn from_contract(snapshot_date: NaiveDate, contract: &OptionContract) -> Self {
        Self {
            snapshot_date,
            expiration: contract.expiration,
            strike: contract.strike,
            option_type: contract.option_type,
            volume: contract.volume,
            open_interest: contract.open_interest,
            implied_volatility: contract.implied_volatility,
        }
    }
}

/// Everything the scorer needs for one symbol on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_naive_date")]
    pub snapshot_date: NaiveDate,
    pub stock_price: f64,
    #[serde(default)]
    pub options: Vec<OptionContract>,
    #[serde(default)]
    pub historical: Vec<HistoricalOption>,
}
