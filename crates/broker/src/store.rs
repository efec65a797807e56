//! In-memory position store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::warn;

use odte_core::position::{ExitReason, Position, PositionStatus};
use odte_core::traits::PositionStore;

/// Position store backed by a map, for paper runs and tests.
#[derive(Default)]
pub struct MemoryPositionStore {
    positions: Mutex<HashMap<i64, Position>>,
    next_id: AtomicI64,
}

impl MemoryPositionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Record a freshly-filled position, assigning it an id.
    pub fn insert(&self, mut position: Position) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        position.id = id;
        self.positions.lock().insert(id, position);
        id
    }

    /// Point-in-time copy of one position, open or closed.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<Position> {
        self.positions.lock().get(&id).cloned()
    }

    /// Refresh the mark and unrealized P&L, the way an external price job
    /// would between monitor cycles.
    pub fn set_mark(&self, id: i64, current_price: rust_decimal::Decimal) {
        if let Some(position) = self.positions.lock().get_mut(&id) {
            position.current_price = Some(current_price);
        }
    }
}

#[async_trait]
impl PositionStore for MemoryPositionStore {
    async fn open_positions(&self) -> Result<Vec<Position>> {
        let mut open: Vec<Position> = self
            .positions
            .lock()
            .values()
            .filter(|p| p.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|p| p.opened_at);
        Ok(open)
    }

    async fn mark_closed(
        &self,
        id: i64,
        reason: &ExitReason,
        closed_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut positions = self.positions.lock();
        let Some(position) = positions.get_mut(&id) else {
            anyhow::bail!("unknown position id {id}");
        };

        // Closed is terminal; a late close attempt is a no-op.
        if position.status == PositionStatus::Closed {
            warn!(position_id = id, "Ignoring close of already-closed position");
            return Ok(());
        }

        position.status = PositionStatus::Closed;
        position.closed_at = Some(closed_at);
        position.exit_reason = Some(reason.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odte_core::position::PositionKind;
    use odte_core::signal::StrategyKind;
    use rust_decimal_macros::dec;

    fn position() -> Position {
        Position {
            id: 0,
            symbol: "SPY251219C00600000".to_string(),
            strategy: StrategyKind::IvMeanReversion,
            kind: PositionKind::Long,
            quantity: 1,
            entry_price: dec!(10.00),
            current_price: None,
            unrealized_pnl: None,
            expiry: None,
            opened_at: Utc::now(),
            closed_at: None,
            exit_reason: None,
            status: PositionStatus::Open,
            legs: vec![],
            net_credit: None,
            max_loss: None,
            breakout: None,
        }
    }

    #[tokio::test]
    async fn close_is_terminal() {
        let store = MemoryPositionStore::new();
        let id = store.insert(position());

        let reason = ExitReason::ProfitTarget {
            pnl_pct: dec!(0.5),
        };
        store.mark_closed(id, &reason, Utc::now()).await.unwrap();
        assert!(store.open_positions().await.unwrap().is_empty());

        // A second close must not overwrite the recorded reason.
        let second = ExitReason::EarningsBlackout;
        store.mark_closed(id, &second, Utc::now()).await.unwrap();
        assert_eq!(store.get(id).unwrap().exit_reason, Some(reason));
    }

    #[tokio::test]
    async fn price_refresh_updates_the_mark() {
        let store = MemoryPositionStore::new();
        let id = store.insert(position());

        store.set_mark(id, dec!(12.50));
        let refreshed = store.get(id).unwrap();
        assert_eq!(refreshed.current_price, Some(dec!(12.50)));
        assert_eq!(refreshed.pnl_pct(), Some(dec!(0.25)));
    }

    #[tokio::test]
    async fn unknown_id_errors() {
        let store = MemoryPositionStore::new();
        let reason = ExitReason::EarningsBlackout;
        assert!(store.mark_closed(42, &reason, Utc::now()).await.is_err());
    }

    #[tokio::test]
    async fn open_positions_sorted_by_open_time() {
        let store = MemoryPositionStore::new();
        let mut older = position();
        older.opened_at = Utc::now() - chrono::Duration::hours(2);
        let newer = position();
        let newer_id = store.insert(newer);
        let older_id = store.insert(older);

        let open = store.open_positions().await.unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].id, older_id);
        assert_eq!(open[1].id, newer_id);
    }
}
