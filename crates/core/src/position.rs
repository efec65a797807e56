//! Open-position model and the exit reasons the monitor can produce.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::{OptionRight, OrderSide};
use crate::signal::StrategyKind;

/// What kind of exposure a position carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    Long,
    Short,
    Spread,
}

/// Lifecycle state. `Closed` is terminal — no further mutation permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// One leg of a multi-leg position, as recorded at fill time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegSnapshot {
    /// OCC contract symbol.
    pub symbol: String,
    pub side: OrderSide,
    pub option_type: OptionRight,
    pub strike: Decimal,
    pub quantity: u32,
    pub entry_price: Option<Decimal>,
}

/// Breakout direction for an opening-range position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutDirection {
    Bullish,
    Bearish,
}

/// Opening range recorded when a breakout position was entered.
///
/// The range boundaries drive thesis invalidation; `target_price` is the
/// range width × 1.5 projected beyond the breakout side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutContext {
    pub range_high: Decimal,
    pub range_low: Decimal,
    pub direction: BreakoutDirection,
    pub target_price: Decimal,
}

/// Why the monitor decided to close a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitReason {
    /// Profit target hit; `pnl_pct` is the fractional gain at decision time.
    ProfitTarget { pnl_pct: Decimal },
    /// Stop loss hit on the position's own price.
    StopLoss { pnl_pct: Decimal },
    /// Too close to expiry for the strategy's gamma tolerance.
    DteThreshold { dte: i64 },
    /// Earnings inside the blackout window.
    EarningsBlackout,
    /// Multi-leg loss reached the credit-multiple stop.
    CreditStopLoss { loss: Decimal },
    /// Wall-clock force close at an exchange-local time.
    ForceClose { at: NaiveTime, note: String },
    /// Underlying moved inside the breach buffer of a short strike.
    StrikeBreached {
        right: OptionRight,
        distance_pct: Decimal,
    },
    /// Price re-entered the opening range, invalidating the breakout thesis.
    RangeInvalidated { price: Decimal, boundary: Decimal },
    /// Underlying reached the projected breakout target.
    TargetReached { price: Decimal, target: Decimal },
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProfitTarget { pnl_pct } => {
                write!(f, "profit target reached ({:.1}%)", pnl_pct * Decimal::from(100))
            }
            Self::StopLoss { pnl_pct } => {
                write!(f, "stop loss hit ({:.1}%)", pnl_pct * Decimal::from(100))
            }
            Self::DteThreshold { dte } => write!(f, "{dte} DTE — expiry threshold reached"),
            Self::EarningsBlackout => write!(f, "earnings within blackout window"),
            Self::CreditStopLoss { loss } => write!(f, "2x credit stop loss hit (${loss:.2} loss)"),
            Self::ForceClose { at, note } => {
                write!(f, "{} force close ({note})", at.format("%H:%M"))
            }
            Self::StrikeBreached {
                right,
                distance_pct,
            } => {
                let side = match right {
                    OptionRight::Call => "call",
                    OptionRight::Put => "put",
                };
                write!(
                    f,
                    "price breached short {side} strike buffer ({:.1}%)",
                    distance_pct * Decimal::from(100)
                )
            }
            Self::RangeInvalidated { price, boundary } => write!(
                f,
                "range invalidation: price re-entered opening range (${price:.2} vs ${boundary:.2})"
            ),
            Self::TargetReached { price, target } => {
                write!(f, "target price reached (${price:.2} vs ${target:.2})")
            }
        }
    }
}

/// An open or closed position tracked by the engine.
///
/// Created externally when an order fills. The monitor mutates only
/// `status`, `closed_at`, and `exit_reason`; price-refresh jobs mutate only
/// `current_price` and `unrealized_pnl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    /// OCC contract symbol for single-leg option positions, plain ticker
    /// for underlying positions and spreads.
    pub symbol: String,
    pub strategy: StrategyKind,
    pub kind: PositionKind,
    pub quantity: u32,
    /// Per-contract entry price; for spreads, the net credit received.
    pub entry_price: Decimal,
    pub current_price: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    /// Contract expiry, where the position has one (None for stock).
    pub expiry: Option<NaiveDate>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub exit_reason: Option<ExitReason>,
    pub status: PositionStatus,
    /// Legs of a spread; empty for single-leg positions.
    pub legs: Vec<LegSnapshot>,
    pub net_credit: Option<Decimal>,
    pub max_loss: Option<Decimal>,
    /// Opening-range context for breakout positions.
    pub breakout: Option<BreakoutContext>,
}

impl Position {
    /// Fractional P&L of the position's own price relative to entry,
    /// sign-adjusted so a favorable move is positive for shorts too.
    ///
    /// `None` when there is no current price or the entry price is zero.
    #[must_use]
    pub fn pnl_pct(&self) -> Option<Decimal> {
        let current = self.current_price?;
        if self.entry_price.is_zero() {
            return None;
        }
        let raw = (current - self.entry_price) / self.entry_price;
        match self.kind {
            PositionKind::Short => Some(-raw),
            _ => Some(raw),
        }
    }

    /// Days until the contract expires, if the position has an expiry.
    #[must_use]
    pub fn days_to_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry.map(|e| (e - today).num_days())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn long_position(entry: Decimal, current: Option<Decimal>) -> Position {
        Position {
            id: 1,
            symbol: "SPY251219C00600000".to_string(),
            strategy: StrategyKind::IvMeanReversion,
            kind: PositionKind::Long,
            quantity: 1,
            entry_price: entry,
            current_price: current,
            unrealized_pnl: None,
            expiry: NaiveDate::from_ymd_opt(2025, 12, 19),
            opened_at: Utc::now(),
            closed_at: None,
            exit_reason: None,
            status: PositionStatus::Open,
            legs: vec![],
            net_credit: None,
            max_loss: None,
            breakout: None,
        }
    }

    #[test]
    fn pnl_pct_long_and_short() {
        let mut pos = long_position(dec!(10.00), Some(dec!(15.00)));
        assert_eq!(pos.pnl_pct(), Some(dec!(0.5)));

        pos.kind = PositionKind::Short;
        assert_eq!(pos.pnl_pct(), Some(dec!(-0.5)));
    }

    #[test]
    fn pnl_pct_requires_prices() {
        let pos = long_position(dec!(10.00), None);
        assert_eq!(pos.pnl_pct(), None);

        let pos = long_position(dec!(0), Some(dec!(1)));
        assert_eq!(pos.pnl_pct(), None);
    }

    #[test]
    fn exit_reason_messages_are_human_readable() {
        let reason = ExitReason::ProfitTarget {
            pnl_pct: dec!(0.62),
        };
        assert_eq!(reason.to_string(), "profit target reached (62.0%)");

        let reason = ExitReason::ForceClose {
            at: NaiveTime::from_hms_opt(15, 50, 0).unwrap(),
            note: "10min before market close".to_string(),
        };
        assert_eq!(reason.to_string(), "15:50 force close (10min before market close)");
    }
}
