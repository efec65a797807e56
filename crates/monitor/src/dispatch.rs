//! Strategy dispatch for exit evaluation.

use anyhow::Result;
use chrono::{DateTime, Utc};

use odte_core::position::{ExitReason, Position};
use odte_core::signal::StrategyKind;
use odte_core::traits::{EarningsCalendar, QuoteSource};

use crate::{breakout, iron_condor, momentum, single_leg};

/// Evaluate one open position against its strategy's exit rules.
///
/// Pure with respect to its inputs: the same position, quotes, and clock
/// produce the same answer, so the polling loop can re-ask safely after a
/// failed close. Returns `Ok(None)` both when no rule fires and when
/// required market data is unavailable this cycle.
pub async fn evaluate_exit(
    quotes: &dyn QuoteSource,
    calendar: &dyn EarningsCalendar,
    position: &Position,
    now: DateTime<Utc>,
) -> Result<Option<ExitReason>> {
    match position.strategy {
        StrategyKind::IronCondor => iron_condor::evaluate(quotes, position, now).await,
        StrategyKind::MomentumScalping => Ok(momentum::evaluate(position, now)),
        StrategyKind::OpeningRangeBreakout => breakout::evaluate(quotes, position, now).await,
        StrategyKind::IvMeanReversion | StrategyKind::Other => {
            single_leg::evaluate(calendar, position, now).await
        }
    }
}
