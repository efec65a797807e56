//! Trade signals, portfolio state, and risk decisions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction a strategy wants to trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
}

/// The strategies this engine knows how to manage.
///
/// `Other` is the explicit default: positions tagged with a label the engine
/// does not recognize get the single-leg exit rules and conservative sizing
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    IvMeanReversion,
    IronCondor,
    MomentumScalping,
    OpeningRangeBreakout,
    Other,
}

impl StrategyKind {
    /// Map a free-form strategy label (as stored alongside historical
    /// positions) onto the closed enum.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("condor") {
            Self::IronCondor
        } else if lower.contains("momentum") {
            Self::MomentumScalping
        } else if lower.contains("orb") || lower.contains("opening_range") {
            Self::OpeningRangeBreakout
        } else if lower.contains("iv") || lower.contains("mean_reversion") {
            Self::IvMeanReversion
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::IvMeanReversion => "iv_mean_reversion",
            Self::IronCondor => "iron_condor",
            Self::MomentumScalping => "momentum_scalping",
            Self::OpeningRangeBreakout => "opening_range_breakout",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A trade candidate produced by a strategy evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub symbol: String,
    pub direction: SignalDirection,
    pub strategy: StrategyKind,
    /// Evaluator confidence in [0, 1].
    pub confidence: f64,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub reasoning: String,
}

/// Portfolio state supplied fresh on every approval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub balance: Decimal,
    pub daily_pnl: Decimal,
    pub win_rate: Decimal,
    pub consecutive_losses: u32,
    pub active_positions: u32,
    pub total_trades: u32,
}

/// Historical performance of one strategy, owned by the stats collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyStats {
    pub win_rate: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub sample_size: u32,
}

/// Immutable outcome of a risk approval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDecision {
    pub approved: bool,
    pub position_size: u32,
    pub max_loss: Decimal,
    pub reasoning: String,
}

impl RiskDecision {
    #[must_use]
    pub fn rejected(reasoning: impl Into<String>) -> Self {
        Self {
            approved: false,
            position_size: 0,
            max_loss: Decimal::ZERO,
            reasoning: reasoning.into(),
        }
    }

    #[must_use]
    pub fn approved(position_size: u32, max_loss: Decimal, reasoning: impl Into<String>) -> Self {
        Self {
            approved: true,
            position_size,
            max_loss,
            reasoning: reasoning.into(),
        }
    }
}
