//! Iron condor exit rules.
//!
//! Reconstructs the spread's cost to close from live leg quotes, then
//! checks profit target, credit-multiple stop, the force-close clock, and
//! short-strike breach — in that order.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use odte_core::market::{occ_underlying, OptionRight, OrderSide};
use odte_core::position::{ExitReason, Position};
use odte_core::traits::QuoteSource;

use crate::session;

const PROFIT_TARGET_PCT: Decimal = dec!(0.50);
const STOP_LOSS_MULTIPLE: Decimal = dec!(2.0);
/// Close when the underlying is within 2% of either short strike.
const BREACH_BUFFER_PCT: Decimal = dec!(0.02);
const CONTRACT_MULTIPLIER: Decimal = dec!(100);

/// Evaluate a condor position. Any leg without a quote aborts this cycle's
/// evaluation for the position — no partial decision is ever made.
pub(crate) async fn evaluate(
    quotes: &dyn QuoteSource,
    position: &Position,
    now: DateTime<Utc>,
) -> Result<Option<ExitReason>> {
    if position.legs.len() < 4 {
        warn!(
            position_id = position.id,
            legs = position.legs.len(),
            "Iron condor position missing legs data"
        );
        return Ok(None);
    }

    // Cost to close: sells owe premium back, buys return premium.
    let mut net = Decimal::ZERO;
    for leg in &position.legs {
        let Some(quote) = quotes.option_quote(&leg.symbol).await? else {
            warn!(
                position_id = position.id,
                symbol = leg.symbol,
                "Cannot get quote for leg"
            );
            return Ok(None);
        };
        let leg_value = quote.mid() * Decimal::from(leg.quantity) * CONTRACT_MULTIPLIER;
        net += match leg.side {
            OrderSide::Sell => -leg_value,
            OrderSide::Buy => leg_value,
        };
    }
    let cost_to_close = net.abs();

    // entry_price carries the net credit per spread.
    let entry_credit = position.entry_price * Decimal::from(position.quantity) * CONTRACT_MULTIPLIER;
    let pnl = entry_credit - cost_to_close;
    let pnl_pct = if entry_credit > Decimal::ZERO {
        pnl / entry_credit
    } else {
        Decimal::ZERO
    };

    debug!(
        position_id = position.id,
        entry_credit = %entry_credit,
        cost_to_close = %cost_to_close,
        pnl = %pnl,
        pnl_pct = %pnl_pct,
        "Iron condor P&L calculated"
    );

    if pnl_pct >= PROFIT_TARGET_PCT {
        return Ok(Some(ExitReason::ProfitTarget { pnl_pct }));
    }

    if pnl <= -(entry_credit * STOP_LOSS_MULTIPLE) {
        return Ok(Some(ExitReason::CreditStopLoss { loss: -pnl }));
    }

    if session::eastern_time(now) >= session::FINAL_FORCE_CLOSE {
        return Ok(Some(ExitReason::ForceClose {
            at: session::FINAL_FORCE_CLOSE,
            note: "10min before market close".to_string(),
        }));
    }

    if let Some(reason) = breach_check(quotes, position).await? {
        return Ok(Some(reason));
    }

    Ok(None)
}

/// Exit early when the underlying drifts inside the breach buffer of a
/// short strike; the spread turns directional fast past that point.
async fn breach_check(
    quotes: &dyn QuoteSource,
    position: &Position,
) -> Result<Option<ExitReason>> {
    let underlying = position
        .legs
        .first()
        .and_then(|leg| occ_underlying(&leg.symbol))
        .unwrap_or(&position.symbol);

    let Some(tick) = quotes.underlying_quote(underlying).await? else {
        return Ok(None);
    };
    let spot = tick.mid();
    if spot <= Decimal::ZERO {
        return Ok(None);
    }

    let short_strike = |right: OptionRight| {
        position
            .legs
            .iter()
            .find(|leg| leg.side == OrderSide::Sell && leg.option_type == right)
            .map(|leg| leg.strike)
    };

    if let Some(strike) = short_strike(OptionRight::Call) {
        let distance_pct = (strike - spot) / spot;
        if distance_pct <= BREACH_BUFFER_PCT {
            return Ok(Some(ExitReason::StrikeBreached {
                right: OptionRight::Call,
                distance_pct,
            }));
        }
    }

    if let Some(strike) = short_strike(OptionRight::Put) {
        let distance_pct = (spot - strike) / spot;
        if distance_pct <= BREACH_BUFFER_PCT {
            return Ok(Some(ExitReason::StrikeBreached {
                right: OptionRight::Put,
                distance_pct,
            }));
        }
    }

    Ok(None)
}
