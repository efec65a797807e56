//! End-to-end lifecycle: seed a chain, build and size a condor, fill it,
//! decay the legs, and watch the monitor take profit.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use odte_broker::seed::seed_demo_chain;
use odte_broker::{
    CannedStatsSource, MemoryPositionStore, NoEarningsCalendar, PaperExecutor, PaperQuoteBook,
};
use odte_core::market::{Greeks, OptionQuote};
use odte_core::position::{ExitReason, LegSnapshot, Position, PositionKind, PositionStatus};
use odte_core::signal::{PortfolioSnapshot, StrategyKind, StrategyStats};
use odte_core::traits::{OrderExecutor, QuoteSource};
use odte_core::MonitorConfig;
use odte_monitor::Monitor;
use odte_risk::RiskManager;
use odte_spread::{build_iron_condor, multi_leg_order};

fn expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 19).unwrap()
}

/// 9:35 ET, two days before expiry.
fn entry_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 17, 14, 35, 0).unwrap()
}

/// 13:00 ET the same day.
fn midday() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 17, 18, 0, 0).unwrap()
}

fn portfolio() -> PortfolioSnapshot {
    PortfolioSnapshot {
        balance: dec!(10000),
        daily_pnl: Decimal::ZERO,
        win_rate: dec!(0.55),
        consecutive_losses: 0,
        active_positions: 0,
        total_trades: 25,
    }
}

#[tokio::test]
async fn condor_lifecycle_from_chain_to_profit_take() {
    let book = Arc::new(PaperQuoteBook::new());
    seed_demo_chain(&book, "SPY", dec!(600), expiry(), 0.40, entry_time());

    // Build and size the condor off the seeded chain.
    let setup = build_iron_condor(book.as_ref(), "SPY", expiry(), 1, entry_time())
        .await
        .expect("demo chain should support a condor");
    assert!(setup.total_credit >= dec!(1.00));
    assert!(setup.short_call_strike > dec!(600));
    assert!(setup.short_put_strike < dec!(600));

    let order = multi_leg_order(&setup);
    assert_eq!(order.legs.len(), 4);
    assert_eq!(order.signed_net_credit(), setup.total_credit);

    let stats = CannedStatsSource::new();
    stats.set(
        StrategyKind::IronCondor,
        StrategyStats {
            win_rate: dec!(0.70),
            avg_win: dec!(50.00),
            avg_loss: dec!(100.00),
            sample_size: 40,
        },
    );
    let risk = RiskManager::new(Arc::new(stats));
    let decision = risk
        .approve_spread(&order, StrategyKind::IronCondor, &portfolio())
        .await;
    assert!(decision.approved, "{}", decision.reasoning);
    assert!(decision.position_size >= 1);

    // Fill it on paper and record the position the way execution would.
    let executor = Arc::new(PaperExecutor::new(dec!(0.65)));
    let fill = executor.submit_order(&order).await.expect("paper fill");
    assert!(fill.filled);

    let store = Arc::new(MemoryPositionStore::new());
    let position_id = store.insert(Position {
        id: 0,
        symbol: setup.underlying.clone(),
        strategy: StrategyKind::IronCondor,
        kind: PositionKind::Spread,
        quantity: 1,
        entry_price: setup.total_credit,
        current_price: None,
        unrealized_pnl: None,
        expiry: Some(expiry()),
        opened_at: entry_time(),
        closed_at: None,
        exit_reason: None,
        status: PositionStatus::Open,
        legs: order
            .legs
            .iter()
            .map(|leg| LegSnapshot {
                symbol: leg.symbol.clone(),
                side: leg.side,
                option_type: leg.option_type,
                strike: leg.strike,
                quantity: leg.quantity,
                entry_price: leg.limit_price,
            })
            .collect(),
        net_credit: Some(setup.total_credit),
        max_loss: order.max_loss,
        breakout: None,
    });

    // First cycle: theta has not done much yet, cost to close is still
    // near the credit, so the position holds.
    let monitor = Monitor::new(
        book.clone(),
        executor.clone(),
        store.clone(),
        Arc::new(NoEarningsCalendar),
        MonitorConfig {
            poll_interval_secs: 1,
        },
    );
    let outcome = monitor.run_cycle(entry_time()).await;
    assert_eq!(outcome.evaluated, 1);
    assert_eq!(outcome.closed, 0);
    assert!(store.get(position_id).unwrap().is_open());

    // Decay every leg to near-worthless: cost to close collapses and the
    // 50% profit target fires.
    for leg in &order.legs {
        let original = book
            .option_quote(&leg.symbol)
            .await
            .unwrap()
            .expect("seeded leg quote");
        book.insert_option(OptionQuote {
            bid: dec!(0.00),
            ask: dec!(0.10),
            greeks: Greeks::default(),
            observed_at: midday(),
            ..original
        });
    }

    let outcome = monitor.run_cycle(midday()).await;
    assert_eq!(outcome.evaluated, 1);
    assert_eq!(outcome.closed, 1);
    assert_eq!(outcome.failures, 0);

    let closed = store.get(position_id).unwrap();
    assert_eq!(closed.status, PositionStatus::Closed);
    assert!(matches!(
        closed.exit_reason,
        Some(ExitReason::ProfitTarget { .. })
    ));
    assert_eq!(executor.closed().len(), 1);
}

#[tokio::test]
async fn single_leg_approval_worked_example() {
    // $10k balance, 55% win rate, $100/$50 payoff: half-Kelly caps to 2%,
    // a $1 stop distance sizes to exactly 2 contracts and $200 max loss.
    let stats = CannedStatsSource::new();
    stats.set(
        StrategyKind::IvMeanReversion,
        StrategyStats {
            win_rate: dec!(0.55),
            avg_win: dec!(100.00),
            avg_loss: dec!(50.00),
            sample_size: 50,
        },
    );
    let risk = RiskManager::new(Arc::new(stats));

    let signal = odte_core::TradeSignal {
        symbol: "SPY251219C00600000".to_string(),
        direction: odte_core::SignalDirection::Buy,
        strategy: StrategyKind::IvMeanReversion,
        confidence: 0.85,
        entry_price: dec!(2.00),
        stop_loss: dec!(1.00),
        take_profit: dec!(4.00),
        reasoning: "IV two sigma above the mean".to_string(),
    };

    let decision = risk.approve(&signal, &portfolio()).await;
    assert!(decision.approved, "{}", decision.reasoning);
    assert_eq!(decision.position_size, 2);
    assert_eq!(decision.max_loss, dec!(200.00));
}
