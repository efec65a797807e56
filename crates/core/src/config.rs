use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub paper: PaperConfig,
}

/// Position monitor loop settings. Risk limits are deliberately absent —
/// they are policy invariants, not configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between monitoring cycles.
    pub poll_interval_secs: u64,
}

/// Paper broker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Per-contract commission applied to simulated fills.
    pub commission_per_contract: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig {
                poll_interval_secs: 60,
            },
            paper: PaperConfig {
                commission_per_contract: Decimal::new(65, 2),
            },
        }
    }
}
