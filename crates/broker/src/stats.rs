//! Canned strategy statistics.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use odte_core::signal::{StrategyKind, StrategyStats};
use odte_core::traits::StatsSource;

/// Stats source seeded by hand. Strategies without an entry report no
/// history, which pushes the risk manager onto its hardcoded defaults.
#[derive(Default)]
pub struct CannedStatsSource {
    table: Mutex<HashMap<StrategyKind, StrategyStats>>,
}

impl CannedStatsSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, strategy: StrategyKind, stats: StrategyStats) {
        self.table.lock().insert(strategy, stats);
    }
}

#[async_trait]
impl StatsSource for CannedStatsSource {
    async fn stats(&self, strategy: StrategyKind) -> Result<Option<StrategyStats>> {
        Ok(self.table.lock().get(&strategy).cloned())
    }
}
