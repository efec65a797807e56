//! Earnings calendar stub.

use anyhow::Result;
use async_trait::async_trait;

use odte_core::traits::EarningsCalendar;

/// Always reports no earnings.
///
/// Extension point: swap in an adapter over a real earnings feed to make
/// the single-leg blackout exit live.
pub struct NoEarningsCalendar;

#[async_trait]
impl EarningsCalendar for NoEarningsCalendar {
    async fn is_earnings_blackout(&self, _symbol: &str) -> Result<bool> {
        Ok(false)
    }
}
