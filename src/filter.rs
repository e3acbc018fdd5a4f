//! Time-of-day filter selecting a sliding 120-minute window of trips.

use anyhow::{Result, anyhow, bail};
use chrono::{NaiveDateTime, Timelike};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Number of minute slots in a day.
pub const MINUTES_PER_DAY: usize = 1440;

/// Half-width of the window around the selected minute.
const HALF_WINDOW: usize = 60;

/// Minute of day (`hour * 60 + minute`) of a timestamp, ignoring date and seconds.
pub fn minutes_since_midnight(t: &NaiveDateTime) -> usize {
    (t.hour() * 60 + t.minute()) as usize
}

/// Which trips an aggregation pass should count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    /// Every trip, regardless of time of day.
    #[default]
    Any,
    /// Trips within 60 minutes either side of this minute of day.
    Around(u16),
}

impl TimeFilter {
    /// Bounds of the half-open window as `(min, max)`, or `None` for [`TimeFilter::Any`].
    ///
    /// When `min > max` the window wraps past midnight.
    pub fn window(&self) -> Option<(usize, usize)> {
        match *self {
            TimeFilter::Any => None,
            TimeFilter::Around(m) => {
                let m = m as usize;
                let min = (m + MINUTES_PER_DAY - HALF_WINDOW) % MINUTES_PER_DAY;
                let max = (m + HALF_WINDOW) % MINUTES_PER_DAY;
                Some((min, max))
            }
        }
    }

    /// Bucket ranges to visit, in order. The second range is empty unless the window wraps.
    pub fn ranges(&self) -> [Range<usize>; 2] {
        match self.window() {
            None => [0..MINUTES_PER_DAY, 0..0],
            Some((min, max)) if min <= max => [min..max, 0..0],
            Some((min, max)) => [min..MINUTES_PER_DAY, 0..max],
        }
    }

    /// Integer form used by slider-style inputs: `-1` for any time, otherwise the minute.
    pub fn as_i32(&self) -> i32 {
        match *self {
            TimeFilter::Any => -1,
            TimeFilter::Around(m) => m as i32,
        }
    }
}

impl TryFrom<i32> for TimeFilter {
    type Error = anyhow::Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(TimeFilter::Any),
            0..=1439 => Ok(TimeFilter::Around(value as u16)),
            _ => bail!("time filter {value} out of range, expected -1 or 0..=1439"),
        }
    }
}

impl FromStr for TimeFilter {
    type Err = anyhow::Error;

    /// Accepts `any`, an integer in `[-1, 1439]`, or a 24-hour `HH:MM`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(TimeFilter::Any);
        }

        if let Some((h, m)) = s.split_once(':') {
            let hour: u16 = h.parse().map_err(|_| anyhow!("invalid hour in '{s}'"))?;
            let minute: u16 = m.parse().map_err(|_| anyhow!("invalid minute in '{s}'"))?;
            if hour >= 24 || minute >= 60 {
                bail!("time '{s}' is not a valid time of day");
            }
            return Ok(TimeFilter::Around(hour * 60 + minute));
        }

        let value: i32 = s
            .parse()
            .map_err(|_| anyhow!("invalid time filter '{s}'"))?;
        TimeFilter::try_from(value)
    }
}

impl fmt::Display for TimeFilter {
    /// `any time`, or a short 12-hour clock label such as `9:05 AM`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimeFilter::Any => write!(f, "any time"),
            TimeFilter::Around(m) => {
                let (hour, minute) = (m / 60, m % 60);
                let suffix = if hour < 12 { "AM" } else { "PM" };
                let hour12 = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                write!(f, "{}:{:02} {}", hour12, minute, suffix)
            }
        }
    }
}
