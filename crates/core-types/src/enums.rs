use serde::{Deserialize, Serialize};

/// The two supported conventions for deriving returns from a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// `price_t / price_{t-1} - 1`
    Simple,
    /// `ln(price_t / price_{t-1})`. Requires strictly positive prices.
    Log,
}

/// The broad market an asset trades on.
///
/// This drives the annualization constant used for volatility and ratio
/// calculations: crypto markets trade every calendar day, equities only on
/// trading days. The concrete periods-per-year values live in configuration,
/// never hard-coded in the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Crypto,
    Equity,
}

/// The lookback window a computation is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
    #[serde(rename = "365d")]
    OneYear,
    #[serde(rename = "max")]
    Max,
}

impl Timeframe {
    /// The number of calendar days covered, or `None` for `Max` (full history).
    pub fn as_days(&self) -> Option<i64> {
        match self {
            Timeframe::SevenDays => Some(7),
            Timeframe::ThirtyDays => Some(30),
            Timeframe::NinetyDays => Some(90),
            Timeframe::OneYear => Some(365),
            Timeframe::Max => None,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Timeframe::SevenDays => "7d",
            Timeframe::ThirtyDays => "30d",
            Timeframe::NinetyDays => "90d",
            Timeframe::OneYear => "365d",
            Timeframe::Max => "max",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Timeframe::SevenDays),
            "30d" => Ok(Timeframe::ThirtyDays),
            "90d" => Ok(Timeframe::NinetyDays),
            "365d" | "1y" => Ok(Timeframe::OneYear),
            "max" => Ok(Timeframe::Max),
            other => Err(format!("unknown timeframe '{}'", other)),
        }
    }
}
