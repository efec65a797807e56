//! Paper fill simulation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::info;

use odte_core::order::{MultiLegOrder, OrderResult};
use odte_core::position::{ExitReason, Position};
use odte_core::traits::OrderExecutor;

/// Simulates fills without touching a broker.
///
/// Multi-leg orders fill atomically at their leg limit prices: either every
/// leg is accepted or the whole order errors, so a paper run can never end
/// up partially hedged.
pub struct PaperExecutor {
    commission_per_contract: Decimal,
    orders: Mutex<Vec<MultiLegOrder>>,
    closes: Mutex<Vec<(i64, ExitReason)>>,
}

impl PaperExecutor {
    #[must_use]
    pub fn new(commission_per_contract: Decimal) -> Self {
        Self {
            commission_per_contract,
            orders: Mutex::new(Vec::new()),
            closes: Mutex::new(Vec::new()),
        }
    }

    /// Orders accepted so far, in submission order.
    #[must_use]
    pub fn submitted(&self) -> Vec<MultiLegOrder> {
        self.orders.lock().clone()
    }

    /// Close requests accepted so far.
    #[must_use]
    pub fn closed(&self) -> Vec<(i64, ExitReason)> {
        self.closes.lock().clone()
    }
}

#[async_trait]
impl OrderExecutor for PaperExecutor {
    async fn submit_order(&self, order: &MultiLegOrder) -> Result<OrderResult> {
        // Validate before accepting anything so rejection leaves no legs.
        for leg in &order.legs {
            if leg.limit_price.is_none() {
                anyhow::bail!("paper fills require a limit price on every leg: {}", leg.symbol);
            }
            if leg.quantity == 0 {
                anyhow::bail!("zero-quantity leg: {}", leg.symbol);
            }
        }

        let contracts: u32 = order.legs.iter().map(|leg| leg.quantity).sum();
        let commission = self.commission_per_contract * Decimal::from(contracts);
        let result = OrderResult {
            order_id: format!("PAPER-{}", Utc::now().timestamp_millis()),
            filled: true,
            filled_at: Utc::now(),
        };

        info!(
            order_id = result.order_id,
            legs = order.legs.len(),
            commission = %commission,
            "Paper fill simulated"
        );

        self.orders.lock().push(order.clone());
        Ok(result)
    }

    async fn close_position(&self, position: &Position, reason: &ExitReason) -> Result<()> {
        info!(
            position_id = position.id,
            symbol = position.symbol,
            reason = %reason,
            "Paper close simulated"
        );
        self.closes.lock().push((position.id, reason.clone()));
        Ok(())
    }
}
