//! Market data types — quotes, greeks snapshots, and OCC symbol handling.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Greeks snapshot attached to an option quote.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

/// Latest bid/ask for an underlying equity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnderlyingQuote {
    pub symbol: String,
    pub bid: Decimal,
    pub ask: Decimal,
}

impl UnderlyingQuote {
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }
}

/// Option quote with greeks, as observed from the data feed.
///
/// Invariant: `ask >= bid`. The paper feed enforces this at insertion;
/// live adapters are expected to do the same.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuote {
    /// OCC-style contract symbol.
    pub symbol: String,
    pub underlying_price: Decimal,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub right: OptionRight,
    pub bid: Decimal,
    pub ask: Decimal,
    pub greeks: Greeks,
    pub iv: f64,
    pub observed_at: DateTime<Utc>,
}

impl OptionQuote {
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }

    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry - today).num_days()
    }
}

/// One expiry's worth of quotes for a single underlying.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionChain {
    pub underlying: String,
    pub underlying_price: Decimal,
    pub expiry: Option<NaiveDate>,
    pub quotes: Vec<OptionQuote>,
}

impl OptionChain {
    /// Quotes of one right, in chain order.
    pub fn by_right(&self, right: OptionRight) -> impl Iterator<Item = &OptionQuote> {
        self.quotes.iter().filter(move |q| q.right == right)
    }

    /// Quote at an exact strike for the given right, if listed.
    pub fn at_strike(&self, right: OptionRight, strike: Decimal) -> Option<&OptionQuote> {
        self.by_right(right).find(|q| q.strike == strike)
    }
}

/// OCC-style option symbol: underlying + YYMMDD + C/P + strike×1000 as
/// eight digits (e.g. `SPY251217C00600000`).
///
/// # Panics
///
/// Panics if `strike * 1000` does not fit in `i64` — strikes that large do
/// not exist on listed equity options.
#[must_use]
pub fn occ_symbol(underlying: &str, expiry: NaiveDate, right: OptionRight, strike: Decimal) -> String {
    let thousandths = (strike * Decimal::from(1000))
        .trunc()
        .to_i64()
        .expect("strike out of range for OCC symbol");
    format!(
        "{}{}{}{:08}",
        underlying.to_uppercase(),
        expiry.format("%y%m%d"),
        right,
        thousandths
    )
}

/// Underlying ticker embedded in an OCC option symbol — the leading run of
/// non-digit characters (e.g. `SPY` from `SPY251217C00600000`).
///
/// Returns `None` when the symbol has no digits at all, i.e. it already is
/// a plain equity ticker.
#[must_use]
pub fn occ_underlying(symbol: &str) -> Option<&str> {
    let first_digit = symbol.find(|c: char| c.is_ascii_digit())?;
    if first_digit == 0 {
        return None;
    }
    Some(&symbol[..first_digit])
}
