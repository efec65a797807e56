//! Hardcoded safety limits.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// The engine's non-negotiable risk limits.
///
/// These are policy invariants, never derived and never adjusted by any
/// code path. They are exposed read-only so operators can see what the
/// engine will refuse to do.
#[derive(Debug, Clone, Serialize)]
pub struct RiskLimits {
    /// Maximum fraction of the portfolio risked on a single trade (2%).
    pub max_portfolio_risk: Decimal,
    /// Maximum position size as a fraction of the portfolio (5%).
    pub max_position_size: Decimal,
    /// Daily P&L fraction at which trading halts (-3%).
    pub daily_loss_limit: Decimal,
    /// Consecutive losses at which trading halts.
    pub max_consecutive_losses: u32,
    /// Standard US equity option contract multiplier.
    pub contract_multiplier: Decimal,
}

impl RiskLimits {
    /// The one and only set of limits this engine trades under.
    #[must_use]
    pub fn hardcoded() -> Self {
        Self {
            max_portfolio_risk: dec!(0.02),
            max_position_size: dec!(0.05),
            daily_loss_limit: dec!(-0.03),
            max_consecutive_losses: 3,
            contract_multiplier: dec!(100),
        }
    }
}
