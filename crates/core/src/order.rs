//! Multi-leg order descriptors handed to the execution collaborator.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::{OptionRight, OrderSide};

/// Spread families the execution layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadStrategy {
    IronCondor,
    CallSpread,
    PutSpread,
    Straddle,
    Strangle,
    Butterfly,
}

/// Single leg of a multi-leg options order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionLeg {
    /// OCC contract symbol.
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u32,
    pub option_type: OptionRight,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub limit_price: Option<Decimal>,
}

/// A multi-leg options order (spread, condor, straddle, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiLegOrder {
    pub strategy_type: SpreadStrategy,
    pub legs: Vec<OptionLeg>,
    pub net_credit: Option<Decimal>,
    pub net_debit: Option<Decimal>,
    pub max_profit: Option<Decimal>,
    pub max_loss: Option<Decimal>,
}

impl MultiLegOrder {
    /// Net per-spread credit implied by the leg limit prices: premium
    /// collected on sells minus premium paid on buys.
    #[must_use]
    pub fn signed_net_credit(&self) -> Decimal {
        self.legs
            .iter()
            .map(|leg| {
                let px = leg.limit_price.unwrap_or(Decimal::ZERO);
                match leg.side {
                    OrderSide::Sell => px,
                    OrderSide::Buy => -px,
                }
            })
            .sum()
    }
}

/// Confirmation returned by the execution collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: String,
    pub filled: bool,
    pub filled_at: DateTime<Utc>,
}
