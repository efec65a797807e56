//! Delta-targeted strike selection.

use tracing::debug;

use odte_core::market::{OptionChain, OptionQuote, OptionRight};

use crate::SpreadError;

/// Find the chain quote whose observed delta is closest to `target_delta`.
///
/// Deltas are compared by magnitude so put targets read the same as call
/// targets (0.15 means "about 15% ITM probability" for both). Quotes with
/// no delta are skipped. Fails when even the best match is farther than
/// `tolerance` from the target.
pub fn find_quote_by_delta(
    chain: &OptionChain,
    right: OptionRight,
    target_delta: f64,
    tolerance: f64,
) -> Result<&OptionQuote, SpreadError> {
    let mut best: Option<(&OptionQuote, f64)> = None;

    for quote in chain.by_right(right) {
        let delta = quote.greeks.delta.abs();
        if delta == 0.0 {
            continue;
        }
        let diff = (delta - target_delta).abs();
        if best.map_or(true, |(_, best_diff)| diff < best_diff) {
            best = Some((quote, diff));
        }
    }

    match best {
        Some((quote, diff)) if diff <= tolerance => {
            debug!(
                underlying = chain.underlying,
                %right,
                strike = %quote.strike,
                delta_diff = diff,
                "Found strike by delta"
            );
            Ok(quote)
        }
        Some((_, diff)) => Err(SpreadError::NoStrikeWithinTolerance {
            right,
            target: target_delta,
            tolerance,
            best_diff: diff,
        }),
        None => Err(SpreadError::NoStrikeWithinTolerance {
            right,
            target: target_delta,
            tolerance,
            best_diff: f64::INFINITY,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use odte_core::market::{occ_symbol, Greeks};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn quote(right: OptionRight, strike: Decimal, delta: f64) -> OptionQuote {
        let expiry = NaiveDate::from_ymd_opt(2025, 12, 17).unwrap();
        OptionQuote {
            symbol: occ_symbol("SPY", expiry, right, strike),
            underlying_price: dec!(600),
            strike,
            expiry,
            right,
            bid: dec!(0.75),
            ask: dec!(0.85),
            greeks: Greeks {
                delta,
                ..Greeks::default()
            },
            iv: 0.18,
            observed_at: Utc::now(),
        }
    }

    fn chain(quotes: Vec<OptionQuote>) -> OptionChain {
        OptionChain {
            underlying: "SPY".to_string(),
            underlying_price: dec!(600),
            expiry: NaiveDate::from_ymd_opt(2025, 12, 17),
            quotes,
        }
    }

    #[test]
    fn picks_closest_delta_of_requested_right() {
        let chain = chain(vec![
            quote(OptionRight::Call, dec!(603), 0.25),
            quote(OptionRight::Call, dec!(605), 0.16),
            quote(OptionRight::Call, dec!(608), 0.09),
            quote(OptionRight::Put, dec!(595), -0.15),
        ]);
        let best = find_quote_by_delta(&chain, OptionRight::Call, 0.15, 0.05).unwrap();
        assert_eq!(best.strike, dec!(605));
    }

    #[test]
    fn put_deltas_match_by_magnitude() {
        let chain = chain(vec![
            quote(OptionRight::Put, dec!(595), -0.14),
            quote(OptionRight::Put, dec!(590), -0.07),
        ]);
        let best = find_quote_by_delta(&chain, OptionRight::Put, 0.15, 0.05).unwrap();
        assert_eq!(best.strike, dec!(595));
    }

    #[test]
    fn accepts_deltas_near_the_tolerance_edge() {
        let near = chain(vec![quote(OptionRight::Call, dec!(610), 0.195)]);
        assert!(find_quote_by_delta(&near, OptionRight::Call, 0.15, 0.05).is_ok());

        let far = chain(vec![quote(OptionRight::Call, dec!(610), 0.21)]);
        assert!(find_quote_by_delta(&far, OptionRight::Call, 0.15, 0.05).is_err());
    }

    #[test]
    fn rejects_when_best_match_outside_tolerance() {
        let chain = chain(vec![quote(OptionRight::Call, dec!(601), 0.45)]);
        let err = find_quote_by_delta(&chain, OptionRight::Call, 0.15, 0.05).unwrap_err();
        assert!(matches!(err, SpreadError::NoStrikeWithinTolerance { .. }));
    }

    #[test]
    fn rejects_empty_chain() {
        let err = find_quote_by_delta(&chain(vec![]), OptionRight::Call, 0.15, 0.05).unwrap_err();
        assert!(matches!(err, SpreadError::NoStrikeWithinTolerance { .. }));
    }

    #[test]
    fn skips_quotes_without_delta() {
        let chain = chain(vec![
            quote(OptionRight::Call, dec!(604), 0.0),
            quote(OptionRight::Call, dec!(606), 0.13),
        ]);
        let best = find_quote_by_delta(&chain, OptionRight::Call, 0.15, 0.05).unwrap();
        assert_eq!(best.strike, dec!(606));
    }
}
