//! Trade approval — circuit breakers first, then Kelly sizing.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info, warn};

use odte_core::kelly;
use odte_core::order::MultiLegOrder;
use odte_core::signal::{PortfolioSnapshot, RiskDecision, StrategyKind, StrategyStats, TradeSignal};
use odte_core::traits::StatsSource;

use crate::limits::RiskLimits;

/// Minimum closed-trade history before recorded stats are trusted over the
/// hardcoded family defaults.
const MIN_SAMPLE_SIZE: u32 = 10;

/// Approves or rejects trade candidates against the hardcoded limits.
///
/// Checks run in a fixed order and the first failure short-circuits with
/// its own rejection reason: daily-loss breaker, consecutive-loss breaker,
/// Kelly edge, risk distance, position-size floor.
pub struct RiskManager {
    stats: Arc<dyn StatsSource>,
    limits: RiskLimits,
}

impl RiskManager {
    #[must_use]
    pub fn new(stats: Arc<dyn StatsSource>) -> Self {
        Self {
            stats,
            limits: RiskLimits::hardcoded(),
        }
    }

    #[must_use]
    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Evaluate a single-leg trade signal.
    pub async fn approve(
        &self,
        signal: &TradeSignal,
        portfolio: &PortfolioSnapshot,
    ) -> RiskDecision {
        if let Some(rejection) = self.circuit_breakers(portfolio) {
            return rejection;
        }

        let stats = self.stats_or_default(signal.strategy).await;
        let kelly = kelly::kelly_fraction(&stats);
        if kelly <= Decimal::ZERO {
            warn!(strategy = %signal.strategy, kelly = %kelly, "Kelly criterion is negative");
            return RiskDecision::rejected(format!("negative Kelly criterion: {kelly:.4}"));
        }
        let size_fraction = kelly::half_kelly(&stats).min(self.limits.max_portfolio_risk);

        let risk_per_contract =
            (signal.entry_price - signal.stop_loss).abs() * self.limits.contract_multiplier;
        if risk_per_contract.is_zero() {
            error!(symbol = signal.symbol, "Risk per contract is zero");
            return RiskDecision::rejected("invalid signal: risk per contract is zero");
        }
        if signal.entry_price <= Decimal::ZERO {
            return RiskDecision::rejected("invalid signal: non-positive entry price");
        }

        let risk_allocated = portfolio.balance * size_fraction;
        let kelly_size = (risk_allocated / risk_per_contract).floor();
        let max_contracts = (portfolio.balance * self.limits.max_position_size
            / (signal.entry_price * self.limits.contract_multiplier))
            .floor();
        let position_size = kelly_size.min(max_contracts).to_u32().unwrap_or(0);

        if position_size < 1 {
            info!(symbol = signal.symbol, "Position size too small");
            return RiskDecision::rejected(format!(
                "position size too small: {position_size} contracts"
            ));
        }

        let max_loss = risk_per_contract * Decimal::from(position_size);
        info!(
            symbol = signal.symbol,
            position_size,
            max_loss = %max_loss,
            size_fraction = %size_fraction,
            "Trade approved"
        );
        RiskDecision::approved(
            position_size,
            max_loss,
            format!("Kelly sizing: {position_size} contracts, max loss ${max_loss:.2}"),
        )
    }

    /// Evaluate a multi-leg spread order.
    ///
    /// Applies the same circuit breakers, then sizes against the spread's
    /// aggregate max loss instead of a single-leg risk distance, capping by
    /// the credit's notional footprint.
    pub async fn approve_spread(
        &self,
        order: &MultiLegOrder,
        strategy: StrategyKind,
        portfolio: &PortfolioSnapshot,
    ) -> RiskDecision {
        if let Some(rejection) = self.circuit_breakers(portfolio) {
            return rejection;
        }

        let (Some(net_credit), Some(total_max_loss)) = (order.net_credit, order.max_loss) else {
            return RiskDecision::rejected("invalid spread order: missing credit or max loss");
        };
        let base_quantity = order.legs.first().map_or(0, |leg| leg.quantity);
        if base_quantity == 0 || net_credit <= Decimal::ZERO || total_max_loss <= Decimal::ZERO {
            return RiskDecision::rejected("invalid spread order: degenerate legs or pricing");
        }
        let risk_per_spread = total_max_loss / Decimal::from(base_quantity);

        let stats = self.stats_or_default(strategy).await;
        let kelly = kelly::kelly_fraction(&stats);
        if kelly <= Decimal::ZERO {
            warn!(strategy = %strategy, kelly = %kelly, "Kelly criterion is negative");
            return RiskDecision::rejected(format!("negative Kelly criterion: {kelly:.4}"));
        }
        let size_fraction = kelly::half_kelly(&stats).min(self.limits.max_portfolio_risk);

        let kelly_size = (portfolio.balance * size_fraction / risk_per_spread).floor();
        let max_spreads = (portfolio.balance * self.limits.max_position_size
            / (net_credit * self.limits.contract_multiplier))
            .floor();
        let position_size = kelly_size.min(max_spreads).to_u32().unwrap_or(0);

        if position_size < 1 {
            info!(strategy = %strategy, "Spread position size too small");
            return RiskDecision::rejected(format!(
                "position size too small: {position_size} spreads"
            ));
        }

        let max_loss = risk_per_spread * Decimal::from(position_size);
        info!(
            strategy = %strategy,
            position_size,
            max_loss = %max_loss,
            "Spread approved"
        );
        RiskDecision::approved(
            position_size,
            max_loss,
            format!("Kelly spread sizing: {position_size} spreads, max loss ${max_loss:.2}"),
        )
    }

    fn circuit_breakers(&self, portfolio: &PortfolioSnapshot) -> Option<RiskDecision> {
        if portfolio.balance <= Decimal::ZERO {
            return Some(RiskDecision::rejected(
                "invalid portfolio: non-positive balance",
            ));
        }

        let daily_loss_pct = portfolio.daily_pnl / portfolio.balance;
        if daily_loss_pct <= self.limits.daily_loss_limit {
            warn!(
                daily_pnl = %portfolio.daily_pnl,
                limit = %self.limits.daily_loss_limit,
                "Daily loss limit hit"
            );
            return Some(RiskDecision::rejected(format!(
                "daily loss limit hit: {:.2}% <= {:.2}%",
                daily_loss_pct * dec!(100),
                self.limits.daily_loss_limit * dec!(100),
            )));
        }

        if portfolio.consecutive_losses >= self.limits.max_consecutive_losses {
            warn!(
                consecutive_losses = portfolio.consecutive_losses,
                "Consecutive loss limit hit"
            );
            return Some(RiskDecision::rejected(format!(
                "consecutive loss limit: {} >= {}",
                portfolio.consecutive_losses, self.limits.max_consecutive_losses,
            )));
        }

        None
    }

    /// Recorded stats when the sample is deep enough, otherwise the family
    /// defaults. A stats outage never blocks a decision.
    async fn stats_or_default(&self, strategy: StrategyKind) -> StrategyStats {
        match self.stats.stats(strategy).await {
            Ok(Some(stats)) if stats.sample_size >= MIN_SAMPLE_SIZE => stats,
            Ok(_) => {
                warn!(strategy = %strategy, "Insufficient trade history, using defaults");
                family_defaults(strategy)
            }
            Err(e) => {
                error!(strategy = %strategy, error = %e, "Failed to get strategy stats");
                generic_defaults()
            }
        }
    }
}

/// Research-based defaults used until a strategy accumulates history.
#[must_use]
pub fn family_defaults(strategy: StrategyKind) -> StrategyStats {
    match strategy {
        StrategyKind::IvMeanReversion => StrategyStats {
            win_rate: dec!(0.75),
            avg_win: dec!(120.00),
            avg_loss: dec!(80.00),
            sample_size: 0,
        },
        _ => generic_defaults(),
    }
}

fn generic_defaults() -> StrategyStats {
    StrategyStats {
        win_rate: dec!(0.55),
        avg_win: dec!(100.00),
        avg_loss: dec!(50.00),
        sample_size: 0,
    }
}
