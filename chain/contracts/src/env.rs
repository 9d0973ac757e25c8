//! Execution environment supplied with every call
//!
//! The block timestamp is both an ordering input (trade ids) and the key for
//! schedule lookups; the base fee only feeds chain entropy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Block metadata visible to contract code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEnv {
    /// Unix seconds, UTC.
    pub timestamp: i64,
    pub base_fee: u64,
}

impl BlockEnv {
    pub fn new(timestamp: i64, base_fee: u64) -> Self {
        Self {
            timestamp,
            base_fee,
        }
    }

    pub fn at(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime.timestamp(), 0)
    }

    /// Weekday index, 0 = Sunday when `epoch_offset` is the epoch's weekday.
    pub fn weekday(&self, epoch_offset: u8) -> usize {
        (self.timestamp.div_euclid(SECONDS_PER_DAY) + i64::from(epoch_offset)).rem_euclid(7) as usize
    }

    /// Hour of day in UTC, 0..=23.
    pub fn hour(&self) -> usize {
        self.timestamp.div_euclid(SECONDS_PER_HOUR).rem_euclid(24) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EPOCH_WEEKDAY_OFFSET;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_epoch_is_thursday() {
        let env = BlockEnv::new(0, 0);
        assert_eq!(env.weekday(EPOCH_WEEKDAY_OFFSET), 4);
        assert_eq!(env.hour(), 0);
    }

    #[test]
    fn test_weekday_and_hour_agree_with_chrono() {
        for ts in [1_700_000_000i64, 1_704_067_199, 1_735_689_600, 1_760_745_600 + 13 * 3600] {
            let dt = Utc.timestamp_opt(ts, 0).unwrap();
            let env = BlockEnv::at(dt);
            assert_eq!(
                env.weekday(EPOCH_WEEKDAY_OFFSET),
                dt.weekday().num_days_from_sunday() as usize
            );
            assert_eq!(env.hour(), dt.hour() as usize);
        }
    }

    #[test]
    fn test_pre_epoch_timestamps_wrap() {
        // 1969-12-31 23:00 UTC, a Wednesday
        let env = BlockEnv::new(-3_600, 0);
        assert_eq!(env.weekday(EPOCH_WEEKDAY_OFFSET), 3);
        assert_eq!(env.hour(), 23);
    }
}
