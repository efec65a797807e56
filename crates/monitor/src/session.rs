//! Exchange-session clock helpers.
//!
//! All force-close rules are written against the exchange's wall clock
//! (US/Eastern), not UTC.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::US::Eastern;

const fn hm(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => panic!("invalid time literal"),
    }
}

/// Final force close for 0DTE spreads, ten minutes before the bell.
pub const FINAL_FORCE_CLOSE: NaiveTime = hm(15, 50);

/// Momentum scalps exit before the lunch decay window.
pub const MOMENTUM_DECAY_CUTOFF: NaiveTime = hm(11, 30);

/// Breakout positions close earlier than other 0DTE strategies, leaving
/// time for execution.
pub const BREAKOUT_FORCE_CLOSE: NaiveTime = hm(15, 0);

/// Current exchange-local wall-clock time.
#[must_use]
pub fn eastern_time(now: DateTime<Utc>) -> NaiveTime {
    now.with_timezone(&Eastern).time()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn converts_winter_and_summer_offsets() {
        // EST: UTC-5.
        let december = Utc.with_ymd_and_hms(2025, 12, 17, 20, 50, 0).unwrap();
        assert_eq!(eastern_time(december), hm(15, 50));

        // EDT: UTC-4.
        let june = Utc.with_ymd_and_hms(2025, 6, 17, 19, 50, 0).unwrap();
        assert_eq!(eastern_time(june), hm(15, 50));
    }
}
