//! Wall-clock times of day as minutes since midnight.
//!
//! Bookings are same-day and timezone-naive: a time is just `hours * 60 + minutes`
//! parsed from an `H:MM` or `HH:MM` string. Malformed input is rejected instead of
//! producing a value that silently compares false against everything.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minutes since midnight, always in `0..1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeMinutes(u16);

impl TimeMinutes {
    pub const MIDNIGHT: TimeMinutes = TimeMinutes(0);

    /// Build a time from an hour (`0..=23`) and minute (`0..=59`).
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(TimeMinutes(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Build a time from a raw minute count (`0..1440`).
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(TimeMinutes(minutes))
    }

    pub fn as_minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Signed distance in minutes from `self` to `later`.
    pub fn minutes_until(self, later: TimeMinutes) -> i64 {
        i64::from(later.0) - i64::from(self.0)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

/// Parse an `H:MM` or `HH:MM` 24-hour time into minutes since midnight.
///
/// # Errors
/// Returns `EngineError::InvalidTime` for anything else: missing colon, non-digit
/// characters, a one-digit minute field, seconds, whitespace, or out-of-range
/// hour/minute values.
pub fn parse_time(input: &str) -> Result<TimeMinutes> {
    let invalid = || EngineError::InvalidTime(input.to_string());

    let (hours, minutes) = input.split_once(':').ok_or_else(invalid)?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return Err(invalid());
    }

    let hour: u16 = hours.parse().map_err(|_| invalid())?;
    let minute: u16 = minutes.parse().map_err(|_| invalid())?;

    TimeMinutes::from_hm(hour, minute).ok_or_else(invalid)
}

impl FromStr for TimeMinutes {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        parse_time(s)
    }
}

impl fmt::Display for TimeMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl From<NaiveTime> for TimeMinutes {
    /// Truncates seconds.
    fn from(time: NaiveTime) -> Self {
        TimeMinutes((time.hour() * 60 + time.minute()) as u16)
    }
}

impl Serialize for TimeMinutes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeMinutes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(TimeMinutes::from_hm(9, 5).unwrap().to_string(), "09:05");
        assert_eq!(TimeMinutes::MIDNIGHT.to_string(), "00:00");
    }

    #[test]
    fn naive_time_conversion_drops_seconds() {
        let t = NaiveTime::from_hms_opt(14, 30, 59).unwrap();
        assert_eq!(TimeMinutes::from(t).as_minutes(), 14 * 60 + 30);
        assert_eq!(TimeMinutes::from(t).to_naive_time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn from_minutes_rejects_end_of_day() {
        assert!(TimeMinutes::from_minutes(1439).is_some());
        assert!(TimeMinutes::from_minutes(1440).is_none());
    }
}
