pub mod config;
pub mod config_loader;
pub mod greeks;
pub mod kelly;
pub mod market;
pub mod order;
pub mod position;
pub mod signal;
pub mod traits;

pub use config::{AppConfig, MonitorConfig, PaperConfig};
pub use config_loader::ConfigLoader;
pub use market::{Greeks, OptionChain, OptionQuote, OptionRight, OrderSide, UnderlyingQuote};
pub use order::{MultiLegOrder, OptionLeg, OrderResult, SpreadStrategy};
pub use position::{
    BreakoutContext, BreakoutDirection, ExitReason, LegSnapshot, Position, PositionKind,
    PositionStatus,
};
pub use signal::{
    PortfolioSnapshot, RiskDecision, SignalDirection, StrategyKind, StrategyStats, TradeSignal,
};
pub use traits::{EarningsCalendar, OrderExecutor, PositionStore, QuoteSource, StatsSource};
