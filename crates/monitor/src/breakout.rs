//! Opening-range breakout exit rules.
//!
//! The entry thesis is a clean break of the opening range; everything here
//! is about detecting when that thesis stops being true, taking the option
//! profit band, or running out of session.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use odte_core::market::occ_underlying;
use odte_core::position::{BreakoutDirection, ExitReason, Position};
use odte_core::traits::QuoteSource;

use crate::session;

const PROFIT_TARGET: Decimal = dec!(0.50);
const STOP_LOSS: Decimal = dec!(-0.40);

/// Checked in order: range invalidation, option profit/stop band, breakout
/// target, 15:00 force close. Needs the underlying's live price; a missing
/// quote skips the position until the next cycle.
pub(crate) async fn evaluate(
    quotes: &dyn QuoteSource,
    position: &Position,
    now: DateTime<Utc>,
) -> Result<Option<ExitReason>> {
    let underlying = occ_underlying(&position.symbol).unwrap_or(&position.symbol);
    let Some(tick) = quotes.underlying_quote(underlying).await? else {
        warn!(
            position_id = position.id,
            symbol = underlying,
            "Cannot get underlying price for breakout exit check"
        );
        return Ok(None);
    };
    let spot = tick.mid();

    if let Some(ctx) = &position.breakout {
        match ctx.direction {
            BreakoutDirection::Bullish if spot <= ctx.range_high => {
                return Ok(Some(ExitReason::RangeInvalidated {
                    price: spot,
                    boundary: ctx.range_high,
                }));
            }
            BreakoutDirection::Bearish if spot >= ctx.range_low => {
                return Ok(Some(ExitReason::RangeInvalidated {
                    price: spot,
                    boundary: ctx.range_low,
                }));
            }
            _ => {}
        }
    }

    if let Some(pnl_pct) = position.pnl_pct() {
        if pnl_pct >= PROFIT_TARGET {
            return Ok(Some(ExitReason::ProfitTarget { pnl_pct }));
        }
        if pnl_pct <= STOP_LOSS {
            return Ok(Some(ExitReason::StopLoss { pnl_pct }));
        }
    }

    if let Some(ctx) = &position.breakout {
        let target_hit = match ctx.direction {
            BreakoutDirection::Bullish => spot >= ctx.target_price,
            BreakoutDirection::Bearish => spot <= ctx.target_price,
        };
        if target_hit {
            return Ok(Some(ExitReason::TargetReached {
                price: spot,
                target: ctx.target_price,
            }));
        }
    }

    if session::eastern_time(now) >= session::BREAKOUT_FORCE_CLOSE {
        return Ok(Some(ExitReason::ForceClose {
            at: session::BREAKOUT_FORCE_CLOSE,
            note: "time exit with room to execute".to_string(),
        }));
    }

    Ok(None)
}
