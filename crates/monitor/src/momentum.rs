//! Momentum-scalp exit rules.
//!
//! Scalps trade the underlying itself, so P&L comes straight off the
//! position's own mark. Entries never survive into the lunch decay window.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use odte_core::position::{ExitReason, Position};

use crate::session;

const PROFIT_TARGET: Decimal = dec!(0.50);
const STOP_LOSS: Decimal = dec!(-0.50);

/// Checked in order: decay-window force close, final force close, then the
/// symmetric 50% profit/stop band.
pub(crate) fn evaluate(position: &Position, now: DateTime<Utc>) -> Option<ExitReason> {
    let now_et = session::eastern_time(now);

    if now_et >= session::MOMENTUM_DECAY_CUTOFF {
        return Some(ExitReason::ForceClose {
            at: session::MOMENTUM_DECAY_CUTOFF,
            note: "avoid lunch decay".to_string(),
        });
    }

    // Guard kept should the decay cutoff ever move past the final bell.
    if now_et >= session::FINAL_FORCE_CLOSE {
        return Some(ExitReason::ForceClose {
            at: session::FINAL_FORCE_CLOSE,
            note: "gamma risk into the close".to_string(),
        });
    }

    let pnl_pct = position.pnl_pct()?;
    if pnl_pct >= PROFIT_TARGET {
        return Some(ExitReason::ProfitTarget { pnl_pct });
    }
    if pnl_pct <= STOP_LOSS {
        return Some(ExitReason::StopLoss { pnl_pct });
    }

    None
}
