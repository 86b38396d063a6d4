// In crates/core-types/src/types.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One trading day of OHLCV data, as supplied by the data-fetch collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// A bar where every price field equals `close`. Handy when only closes are known.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// An ordered, immutable price history with strictly increasing, unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(Error::Validation(format!(
                "price series dates must be strictly increasing ({} is followed by {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { bars })
    }

    /// Builds a series of close-only bars on consecutive calendar days starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let bars = start
            .iter_days()
            .zip(closes)
            .map(|(date, close)| PriceBar::from_close(date, *close))
            .collect();
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceBar> {
        self.bars.iter()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Index of the bar dated `date`, or of the nearest trading date when it is absent.
    ///
    /// The earlier neighbour wins only when it is strictly closer; ties resolve to the later date.
    pub fn nearest_index(&self, date: NaiveDate) -> Option<usize> {
        if self.bars.is_empty() {
            return None;
        }
        // First position whose date is >= the target.
        let right = self.bars.partition_point(|b| b.date < date);
        if right < self.bars.len() && self.bars[right].date == date {
            return Some(right);
        }
        if right == 0 {
            return Some(0);
        }
        let left = right - 1;
        if right == self.bars.len() {
            return Some(left);
        }
        let left_distance = (date - self.bars[left].date).num_days();
        let right_distance = (self.bars[right].date - date).num_days();
        if left_distance < right_distance {
            Some(left)
        } else {
            Some(right)
        }
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = Error;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

/// A long/flat position signal, one 0/1 value per date of the series it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Signal {
    values: Vec<u8>,
}

impl Signal {
    pub fn new(values: Vec<u8>) -> Result<Self> {
        if let Some((idx, v)) = values.iter().enumerate().find(|(_, v)| **v > 1) {
            return Err(Error::Validation(format!(
                "signal values must be 0 or 1, found {v} at row {idx}"
            )));
        }
        Ok(Self { values })
    }

    pub fn from_flags<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        Self {
            values: flags.into_iter().map(u8::from).collect(),
        }
    }

    pub fn flat(len: usize) -> Self {
        Self {
            values: vec![0; len],
        }
    }

    pub fn long(len: usize) -> Self {
        Self {
            values: vec![1; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<u8> {
        self.values.get(idx).copied()
    }
}

impl TryFrom<Vec<u8>> for Signal {
    type Error = Error;

    fn try_from(values: Vec<u8>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Signal> for Vec<u8> {
    fn from(signal: Signal) -> Self {
        signal.values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(Error::UnknownOptionType(other.to_string())),
        }
    }
}
