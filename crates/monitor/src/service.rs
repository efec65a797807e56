//! The monitoring loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info};

use odte_core::config::MonitorConfig;
use odte_core::position::Position;
use odte_core::traits::{EarningsCalendar, OrderExecutor, PositionStore, QuoteSource};

use crate::dispatch::evaluate_exit;

/// What one monitoring cycle did.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleOutcome {
    pub evaluated: usize,
    pub closed: usize,
    pub failures: usize,
}

/// Polls open positions and closes the ones whose exit rules fire.
///
/// A single cooperative task: positions are evaluated sequentially within
/// a cycle, so two closes can never race on the same position. Collaborators
/// are injected once at construction.
pub struct Monitor {
    quotes: Arc<dyn QuoteSource>,
    executor: Arc<dyn OrderExecutor>,
    store: Arc<dyn PositionStore>,
    calendar: Arc<dyn EarningsCalendar>,
    config: MonitorConfig,
}

impl Monitor {
    #[must_use]
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        executor: Arc<dyn OrderExecutor>,
        store: Arc<dyn PositionStore>,
        calendar: Arc<dyn EarningsCalendar>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            quotes,
            executor,
            store,
            calendar,
            config,
        }
    }

    /// Run the monitoring loop until `shutdown` fires.
    ///
    /// Shutdown is observed only at the sleep boundary: a cycle in flight
    /// — including any close it started — always runs to completion.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            poll_secs = self.config.poll_interval_secs,
            "Position monitor started"
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_cycle(Utc::now()).await;
                }
                _ = shutdown.changed() => {
                    info!("Position monitor stopping");
                    return Ok(());
                }
            }
        }
    }

    /// One pass over the open positions. A failure on one position is
    /// logged and must not keep the rest from being evaluated.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();

        let positions = match self.store.open_positions().await {
            Ok(positions) => positions,
            Err(e) => {
                error!(error = %e, "Failed to fetch open positions");
                outcome.failures += 1;
                return outcome;
            }
        };

        if positions.is_empty() {
            debug!("No open positions to monitor");
            return outcome;
        }
        info!(count = positions.len(), "Monitoring positions");

        for position in &positions {
            outcome.evaluated += 1;

            match evaluate_exit(
                self.quotes.as_ref(),
                self.calendar.as_ref(),
                position,
                now,
            )
            .await
            {
                Ok(Some(reason)) => {
                    info!(
                        position_id = position.id,
                        symbol = position.symbol,
                        reason = %reason,
                        "Exit condition met, closing position"
                    );
                    if self.close(position, &reason, now).await {
                        outcome.closed += 1;
                    } else {
                        outcome.failures += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    outcome.failures += 1;
                    error!(
                        position_id = position.id,
                        symbol = position.symbol,
                        error = %e,
                        "Error monitoring individual position"
                    );
                }
            }
        }

        outcome
    }

    /// Issue the close and record it. On failure the position stays open
    /// and the next cycle retries — polling is the retry mechanism.
    async fn close(
        &self,
        position: &Position,
        reason: &odte_core::position::ExitReason,
        now: DateTime<Utc>,
    ) -> bool {
        if let Err(e) = self.executor.close_position(position, reason).await {
            error!(
                position_id = position.id,
                symbol = position.symbol,
                error = %e,
                "Failed to close position"
            );
            return false;
        }

        match self.store.mark_closed(position.id, reason, now).await {
            Ok(()) => {
                info!(
                    position_id = position.id,
                    symbol = position.symbol,
                    exit_reason = %reason,
                    "Position closed"
                );
                true
            }
            Err(e) => {
                error!(
                    position_id = position.id,
                    error = %e,
                    "Close filled but status update failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use odte_broker::{MemoryPositionStore, NoEarningsCalendar, PaperExecutor, PaperQuoteBook};
    use odte_core::market::{OptionQuote, UnderlyingQuote};
    use odte_core::position::{ExitReason, PositionKind, PositionStatus};
    use odte_core::signal::StrategyKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 15, 0, 0).unwrap()
    }

    fn single_leg(entry: Decimal, current: Option<Decimal>) -> Position {
        Position {
            id: 0,
            symbol: "SPY260116C00600000".to_string(),
            strategy: StrategyKind::IvMeanReversion,
            kind: PositionKind::Long,
            quantity: 1,
            entry_price: entry,
            current_price: current,
            unrealized_pnl: None,
            expiry: chrono::NaiveDate::from_ymd_opt(2026, 1, 16),
            opened_at: morning(),
            closed_at: None,
            exit_reason: None,
            status: PositionStatus::Open,
            legs: vec![],
            net_credit: None,
            max_loss: None,
            breakout: None,
        }
    }

    fn monitor(
        quotes: Arc<dyn QuoteSource>,
        executor: Arc<dyn OrderExecutor>,
        store: Arc<MemoryPositionStore>,
    ) -> Monitor {
        Monitor::new(
            quotes,
            executor,
            store,
            Arc::new(NoEarningsCalendar),
            MonitorConfig {
                poll_interval_secs: 1,
            },
        )
    }

    #[tokio::test]
    async fn closes_positions_whose_rules_fire() {
        let store = Arc::new(MemoryPositionStore::new());
        let winner_id = store.insert(single_leg(dec!(10.00), Some(dec!(16.00))));
        let holder_id = store.insert(single_leg(dec!(10.00), Some(dec!(11.00))));

        let executor = Arc::new(PaperExecutor::new(dec!(0.65)));
        let monitor = monitor(
            Arc::new(PaperQuoteBook::new()),
            executor.clone(),
            store.clone(),
        );

        let outcome = monitor.run_cycle(morning()).await;
        assert_eq!(outcome.evaluated, 2);
        assert_eq!(outcome.closed, 1);
        assert_eq!(outcome.failures, 0);

        let closed = store.get(winner_id).unwrap();
        assert_eq!(closed.status, PositionStatus::Closed);
        assert!(matches!(
            closed.exit_reason,
            Some(ExitReason::ProfitTarget { .. })
        ));
        assert!(store.get(holder_id).unwrap().is_open());
        assert_eq!(executor.closed().len(), 1);
    }

    /// Quote source that errors for every option symbol.
    struct BrokenQuotes;

    #[async_trait]
    impl QuoteSource for BrokenQuotes {
        async fn underlying_quote(&self, _symbol: &str) -> Result<Option<UnderlyingQuote>> {
            anyhow::bail!("feed down")
        }

        async fn option_quote(&self, _symbol: &str) -> Result<Option<OptionQuote>> {
            anyhow::bail!("feed down")
        }

        async fn option_chain(
            &self,
            _underlying: &str,
            _expiry: chrono::NaiveDate,
        ) -> Result<odte_core::market::OptionChain> {
            anyhow::bail!("feed down")
        }
    }

    #[tokio::test]
    async fn one_failing_position_does_not_stop_the_cycle() {
        let store = Arc::new(MemoryPositionStore::new());
        // Breakout needs the quote feed, which is down — evaluation errors.
        let mut broken = single_leg(dec!(2.00), Some(dec!(2.10)));
        broken.strategy = StrategyKind::OpeningRangeBreakout;
        store.insert(broken);
        // Single-leg profit target needs no quotes and still fires.
        let winner_id = store.insert(single_leg(dec!(10.00), Some(dec!(16.00))));

        let monitor = monitor(
            Arc::new(BrokenQuotes),
            Arc::new(PaperExecutor::new(dec!(0.65))),
            store.clone(),
        );

        let outcome = monitor.run_cycle(morning()).await;
        assert_eq!(outcome.evaluated, 2);
        assert_eq!(outcome.closed, 1);
        assert_eq!(outcome.failures, 1);
        assert_eq!(store.get(winner_id).unwrap().status, PositionStatus::Closed);
    }

    /// Executor whose close orders are rejected by the broker.
    struct RejectingExecutor;

    #[async_trait]
    impl OrderExecutor for RejectingExecutor {
        async fn submit_order(
            &self,
            _order: &odte_core::order::MultiLegOrder,
        ) -> Result<odte_core::order::OrderResult> {
            anyhow::bail!("order rejected")
        }

        async fn close_position(&self, _position: &Position, _reason: &ExitReason) -> Result<()> {
            anyhow::bail!("order rejected")
        }
    }

    #[tokio::test]
    async fn failed_close_leaves_position_open_for_retry() {
        let store = Arc::new(MemoryPositionStore::new());
        let id = store.insert(single_leg(dec!(10.00), Some(dec!(16.00))));

        let monitor = monitor(
            Arc::new(PaperQuoteBook::new()),
            Arc::new(RejectingExecutor),
            store.clone(),
        );

        let outcome = monitor.run_cycle(morning()).await;
        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.closed, 0);
        assert!(store.get(id).unwrap().is_open(), "position must stay open");

        // Next cycle with a working executor completes the close.
        let monitor = monitor_with_executor(store.clone());
        let outcome = monitor.run_cycle(morning()).await;
        assert_eq!(outcome.closed, 1);
        assert_eq!(store.get(id).unwrap().status, PositionStatus::Closed);
    }

    fn monitor_with_executor(store: Arc<MemoryPositionStore>) -> Monitor {
        monitor(
            Arc::new(PaperQuoteBook::new()),
            Arc::new(PaperExecutor::new(dec!(0.65))),
            store,
        )
    }

    #[tokio::test]
    async fn empty_book_is_a_quiet_cycle() {
        let store = Arc::new(MemoryPositionStore::new());
        let monitor = monitor_with_executor(store);
        let outcome = monitor.run_cycle(morning()).await;
        assert_eq!(outcome.evaluated, 0);
        assert_eq!(outcome.failures, 0);
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop_at_the_sleep_boundary() {
        let store = Arc::new(MemoryPositionStore::new());
        let monitor = Arc::new(monitor_with_executor(store));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.run(rx).await }
        });

        // Give the loop a tick, then ask it to stop.
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).expect("monitor still listening");

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("monitor did not stop")
            .expect("monitor task panicked")
            .expect("monitor returned an error");
    }
}
