//! UTC timestamps for result file names and upload tokens.
//!
//! Only instants at or after the Unix epoch are representable, which is all a
//! wall clock reading ever produces.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Current UTC time as Unix milliseconds.
pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A UTC instant split into calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcTime {
    pub year: u64,
    pub month: u64,
    pub day: u64,
    pub hour: u64,
    pub minute: u64,
    pub second: u64,
    pub millis: u64,
}

impl UtcTime {
    pub fn from_unix_millis(unix_millis: u64) -> Self {
        let (year, month, day) = date_from_epoch_days(unix_millis / MILLIS_PER_DAY);
        let in_day = unix_millis % MILLIS_PER_DAY;
        Self {
            year,
            month,
            day,
            hour: in_day / 3_600_000,
            minute: in_day / 60_000 % 60,
            second: in_day / 1000 % 60,
            millis: in_day % 1000,
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, the same shape as JavaScript's `toISOString`.
impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.millis
        )
    }
}

pub fn millis_to_iso8601(unix_millis: u64) -> String {
    UtcTime::from_unix_millis(unix_millis).to_string()
}

pub fn now_iso8601() -> String {
    millis_to_iso8601(now_unix_millis())
}

fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn month_length(year: u64, month: u64) -> u64 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Walk whole years, then whole months, from 1970-01-01.
fn date_from_epoch_days(mut days: u64) -> (u64, u64, u64) {
    let mut year = 1970;
    loop {
        let year_length = if is_leap_year(year) { 366 } else { 365 };
        if days < year_length {
            break;
        }
        days -= year_length;
        year += 1;
    }
    let mut month = 1;
    while days >= month_length(year, month) {
        days -= month_length(year, month);
        month += 1;
    }
    (year, month, days + 1)
}
