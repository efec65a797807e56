//! Collaborator ports.
//!
//! Everything the engine needs from the outside world — quotes, execution,
//! the position store, strategy statistics, the earnings calendar — enters
//! through these traits. Implementations are constructed once at startup
//! and passed in explicitly; there are no ambient globals.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::market::{OptionChain, OptionQuote, UnderlyingQuote};
use crate::order::{MultiLegOrder, OrderResult};
use crate::position::{ExitReason, Position};
use crate::signal::{StrategyKind, StrategyStats};

/// Market data lookups. `Ok(None)` means the symbol has no quote right now;
/// callers skip and retry next cycle rather than fail.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn underlying_quote(&self, symbol: &str) -> Result<Option<UnderlyingQuote>>;

    async fn option_quote(&self, symbol: &str) -> Result<Option<OptionQuote>>;

    async fn option_chain(&self, underlying: &str, expiry: NaiveDate) -> Result<OptionChain>;
}

/// Order placement and position closing against the broker.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Submit a multi-leg order. All legs fill or the call errors — no
    /// partially hedged spreads are left behind.
    async fn submit_order(&self, order: &MultiLegOrder) -> Result<OrderResult>;

    /// Close an open position at market.
    async fn close_position(&self, position: &Position, reason: &ExitReason) -> Result<()>;
}

/// Persistence boundary for positions.
#[async_trait]
pub trait PositionStore: Send + Sync {
    async fn open_positions(&self) -> Result<Vec<Position>>;

    async fn mark_closed(
        &self,
        id: i64,
        reason: &ExitReason,
        closed_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Historical performance lookup for Kelly sizing. `Ok(None)` when the
/// strategy has no recorded history yet.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn stats(&self, strategy: StrategyKind) -> Result<Option<StrategyStats>>;
}

/// Earnings-calendar lookup used by the single-leg exit rules.
#[async_trait]
pub trait EarningsCalendar: Send + Sync {
    async fn is_earnings_blackout(&self, symbol: &str) -> Result<bool>;
}
