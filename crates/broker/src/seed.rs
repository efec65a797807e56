//! Demo chain seeding.
//!
//! Populates a [`PaperQuoteBook`](crate::quotes::PaperQuoteBook) with a
//! Black-Scholes-priced option chain around a chosen spot, so the CLI and
//! integration tests have something realistic to select strikes from.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use odte_core::greeks;
use odte_core::market::{occ_symbol, OptionQuote, OptionRight, UnderlyingQuote};

use crate::quotes::PaperQuoteBook;

/// Strikes are laid out on $5 increments, ten on each side of the money.
const STRIKE_STEP: Decimal = dec!(5);
const STRIKES_PER_SIDE: i64 = 10;
/// Half-spread applied around each theoretical mid.
const HALF_SPREAD: Decimal = dec!(0.05);

/// Seed an underlying quote plus a full call/put chain for one expiry.
///
/// Prices and greeks come from the Black-Scholes engine at the given flat
/// volatility, so chain deltas are internally consistent with the spot.
pub fn seed_demo_chain(
    book: &PaperQuoteBook,
    underlying: &str,
    spot: Decimal,
    expiry: NaiveDate,
    iv: f64,
    now: DateTime<Utc>,
) {
    book.set_underlying(UnderlyingQuote {
        symbol: underlying.to_string(),
        bid: spot - HALF_SPREAD,
        ask: spot + HALF_SPREAD,
    });

    let s = spot.to_f64().unwrap_or(0.0);
    // Options expire at the 4pm ET close, roughly 21:00 UTC.
    let expiry_instant = expiry
        .and_hms_opt(21, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    let t = greeks::years_to_expiry(expiry_instant, now);
    let r = greeks::DEFAULT_RISK_FREE_RATE;

    let atm = (spot / STRIKE_STEP).round() * STRIKE_STEP;
    for step in -STRIKES_PER_SIDE..=STRIKES_PER_SIDE {
        let strike = atm + STRIKE_STEP * Decimal::from(step);
        if strike <= Decimal::ZERO {
            continue;
        }
        let k = strike.to_f64().unwrap_or(0.0);

        for right in [OptionRight::Call, OptionRight::Put] {
            let theoretical = match right {
                OptionRight::Call => greeks::call_price(s, k, t, r, iv),
                OptionRight::Put => greeks::put_price(s, k, t, r, iv),
            };
            let mid = Decimal::from_f64(theoretical)
                .unwrap_or(Decimal::ZERO)
                .round_dp(2);
            let bid = (mid - HALF_SPREAD).max(Decimal::ZERO);

            book.insert_option(OptionQuote {
                symbol: occ_symbol(underlying, expiry, right, strike),
                underlying_price: spot,
                strike,
                expiry,
                right,
                bid,
                ask: mid + HALF_SPREAD,
                greeks: greeks::snapshot(s, k, t, r, iv, right),
                iv,
                observed_at: now,
            });
        }
    }
}
