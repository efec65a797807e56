use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use odte_broker::seed::seed_demo_chain;
use odte_broker::{
    CannedStatsSource, MemoryPositionStore, NoEarningsCalendar, PaperExecutor, PaperQuoteBook,
};
use odte_core::signal::{PortfolioSnapshot, StrategyKind};
use odte_core::ConfigLoader;
use odte_monitor::Monitor;
use odte_risk::{RiskLimits, RiskManager};
use odte_spread::{build_iron_condor, multi_leg_order};

#[derive(Parser)]
#[command(name = "odte-trade")]
#[command(about = "Options risk and position-lifecycle engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the position monitor against the paper broker
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Print the hardcoded risk limits
    Limits,
    /// Build and size an iron condor against a seeded demo chain
    Condor {
        /// Underlying symbol
        #[arg(long, default_value = "SPY")]
        underlying: String,
        /// Spot price to seed the demo chain at
        #[arg(long, default_value = "600")]
        spot: Decimal,
        /// Expiry date (defaults to today, i.e. 0DTE)
        #[arg(long)]
        expiry: Option<NaiveDate>,
        /// Number of condors
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        /// Flat volatility for the demo chain (0DTE credits need it high)
        #[arg(long, default_value_t = 0.60)]
        iv: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => run_monitor(&config).await,
        Commands::Limits => print_limits(),
        Commands::Condor {
            underlying,
            spot,
            expiry,
            quantity,
            iv,
        } => build_condor(&underlying, spot, expiry, quantity, iv).await,
    }
}

/// Wire the paper collaborators together and run the monitor loop until
/// ctrl-c.
async fn run_monitor(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load_from(config_path)?;

    let quotes = Arc::new(PaperQuoteBook::new());
    let now = Utc::now();
    seed_demo_chain(&quotes, "SPY", dec!(600), now.date_naive(), 0.18, now);

    let executor = Arc::new(PaperExecutor::new(config.paper.commission_per_contract));
    let store = Arc::new(MemoryPositionStore::new());
    let monitor = Arc::new(Monitor::new(
        quotes,
        executor,
        store,
        Arc::new(NoEarningsCalendar),
        config.monitor,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let monitor = monitor.clone();
        async move { monitor.run(shutdown_rx).await }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(true);
    handle.await??;

    Ok(())
}

fn print_limits() -> Result<()> {
    let limits = RiskLimits::hardcoded();
    println!("{}", serde_json::to_string_pretty(&limits)?);
    Ok(())
}

/// Seed a demo chain, build a condor off it, and show how the risk manager
/// would size it against a $10k paper portfolio.
async fn build_condor(
    underlying: &str,
    spot: Decimal,
    expiry: Option<NaiveDate>,
    quantity: u32,
    iv: f64,
) -> Result<()> {
    let now = Utc::now();
    let expiry = expiry.unwrap_or_else(|| now.date_naive());

    let book = PaperQuoteBook::new();
    seed_demo_chain(&book, underlying, spot, expiry, iv, now);

    let setup = build_iron_condor(&book, underlying, expiry, quantity, now).await?;
    let order = multi_leg_order(&setup);

    let risk = RiskManager::new(Arc::new(CannedStatsSource::new()));
    let portfolio = PortfolioSnapshot {
        balance: dec!(10000),
        daily_pnl: Decimal::ZERO,
        win_rate: dec!(0.55),
        consecutive_losses: 0,
        active_positions: 0,
        total_trades: 0,
    };
    let decision = risk
        .approve_spread(&order, StrategyKind::IronCondor, &portfolio)
        .await;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "setup": setup,
            "order": order,
            "decision": decision,
        }))?
    );
    Ok(())
}
