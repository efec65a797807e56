//! Default single-leg exit rules (IV mean reversion and unrecognized
//! strategies).

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use odte_core::market::occ_underlying;
use odte_core::position::{ExitReason, Position};
use odte_core::traits::EarningsCalendar;

const PROFIT_TARGET: Decimal = dec!(0.50);
const STOP_LOSS: Decimal = dec!(-0.75);
/// Close inside three weeks to expiry to stay clear of gamma risk.
const DTE_THRESHOLD: i64 = 21;

/// Checked in order: profit target, stop loss, expiry threshold, earnings
/// blackout.
pub(crate) async fn evaluate(
    calendar: &dyn EarningsCalendar,
    position: &Position,
    now: DateTime<Utc>,
) -> Result<Option<ExitReason>> {
    if let Some(pnl_pct) = position.pnl_pct() {
        if pnl_pct >= PROFIT_TARGET {
            return Ok(Some(ExitReason::ProfitTarget { pnl_pct }));
        }
        if pnl_pct <= STOP_LOSS {
            return Ok(Some(ExitReason::StopLoss { pnl_pct }));
        }
    } else {
        debug!(position_id = position.id, "No mark yet, skipping P&L checks");
    }

    if let Some(dte) = position.days_to_expiry(now.date_naive()) {
        if dte <= DTE_THRESHOLD {
            return Ok(Some(ExitReason::DteThreshold { dte }));
        }
    }

    let underlying = occ_underlying(&position.symbol).unwrap_or(&position.symbol);
    if calendar.is_earnings_blackout(underlying).await? {
        return Ok(Some(ExitReason::EarningsBlackout));
    }

    Ok(None)
}
