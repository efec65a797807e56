//! Kelly Criterion sizing math.
//!
//! Computes the optimal capital fraction from a strategy's historical win
//! rate and payoff sizes. The risk manager halves it and caps it before any
//! money moves.

use rust_decimal::Decimal;

use crate::signal::StrategyStats;

/// Full Kelly fraction for a strategy's win/loss profile:
///
/// ```text
/// f* = (p·W − (1−p)·L) / W
/// ```
///
/// where `p` is the win rate, `W` the average win, `L` the average loss
/// (as a positive amount). A non-positive average win yields zero — there
/// is no edge to size.
#[must_use]
pub fn kelly_fraction(stats: &StrategyStats) -> Decimal {
    if stats.avg_win <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let loss_rate = Decimal::ONE - stats.win_rate;
    (stats.win_rate * stats.avg_win - loss_rate * stats.avg_loss) / stats.avg_win
}

/// Half-Kelly, the safety margin this engine always applies.
#[must_use]
pub fn half_kelly(stats: &StrategyStats) -> Decimal {
    kelly_fraction(stats) / Decimal::from(2)
}
