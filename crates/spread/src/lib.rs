//! Iron-condor construction — strike selection, spread assembly, and the
//! multi-leg order mapping consumed by execution.

pub mod condor;
pub mod selector;

pub use condor::{
    build_iron_condor, entry_signal, in_entry_window, multi_leg_order, CondorEntry,
    IronCondorSetup,
};
pub use selector::find_quote_by_delta;

use rust_decimal::Decimal;

/// Why a spread could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum SpreadError {
    #[error("no {right} strike within {tolerance} of {target} delta (best diff {best_diff})")]
    NoStrikeWithinTolerance {
        right: odte_core::OptionRight,
        target: f64,
        tolerance: f64,
        best_diff: f64,
    },

    #[error("no quote for protection leg {symbol}")]
    MissingQuote { symbol: String },

    #[error("no price available for underlying {symbol}")]
    NoUnderlyingPrice { symbol: String },

    #[error("credit too low: {credit} < {floor}")]
    CreditTooLow { credit: Decimal, floor: Decimal },

    #[error(transparent)]
    MarketData(#[from] anyhow::Error),
}
