//! Calendar time for day rollover and event timestamps.
//!
//! Two sources exist: a [`NetworkWallClock`] fed by a synchronised
//! [`TimeSource`] (SNTP on the board, the host clock elsewhere) and a
//! [`StaticWallClock`] holding a compiled-in date. [`select_wall_clock`] picks
//! one at startup; the control logic only sees the [`WallClock`] trait.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, ensure, Context};

const SECONDS_PER_DAY: i64 = 86_400;

/// Calendar date, formatted `dd/mm/yyyy`. Only ever compared for equality.
#[derive(Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date {
    day: u8,
    month: u8,
    year: u16,
}

impl Date {
    pub fn new(day: u8, month: u8, year: u16) -> anyhow::Result<Self> {
        ensure!((1..=12).contains(&month), "month {month} out of range");
        ensure!((1..=31).contains(&day), "day {day} out of range");
        Ok(Self { day, month, year })
    }

    pub(crate) const fn from_dmy(day: u8, month: u8, year: u16) -> Self {
        Self { day, month, year }
    }

    /// Gregorian date for a day count relative to 1970-01-01.
    fn from_days_since_epoch(days: i64) -> Self {
        let z = days + 719_468;
        let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self {
            day: day as u8,
            month: month as u8,
            year: year.clamp(0, i64::from(u16::MAX)) as u16,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}

impl FromStr for Date {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut fields = s.splitn(3, '/');
        let mut next = |name: &str| {
            fields
                .next()
                .ok_or_else(|| anyhow!("missing {name} in date {s:?}"))
        };
        let day = next("day")?.parse().context("invalid day")?;
        let month = next("month")?.parse().context("invalid month")?;
        let year = next("year")?.parse().context("invalid year")?;
        Date::new(day, month, year)
    }
}

impl TryFrom<String> for Date {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        s.parse()
    }
}

impl From<Date> for String {
    fn from(date: Date) -> Self {
        date.to_string()
    }
}

/// Time of day, formatted `HH:MM:SS`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8) -> anyhow::Result<Self> {
        ensure!(hour < 24 && minute < 60 && second < 60, "time out of range");
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    fn from_seconds_of_day(secs: i64) -> Self {
        Self {
            hour: (secs / 3_600) as u8,
            minute: (secs % 3_600 / 60) as u8,
            second: (secs % 60) as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        let [hour, minute, second] = fields[..] else {
            return Err(anyhow!("expected HH:MM:SS, got {s:?}"));
        };
        TimeOfDay::new(
            hour.parse().context("invalid hour")?,
            minute.parse().context("invalid minute")?,
            second.parse().context("invalid second")?,
        )
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize)]
pub struct WallTime {
    pub date: Date,
    pub time: TimeOfDay,
}

impl WallTime {
    /// Local time for `unix_secs`, shifted by `utc_offset_secs`.
    pub fn from_unix(unix_secs: i64, utc_offset_secs: i64) -> Self {
        let local = unix_secs + utc_offset_secs;
        Self {
            date: Date::from_days_since_epoch(local.div_euclid(SECONDS_PER_DAY)),
            time: TimeOfDay::from_seconds_of_day(local.rem_euclid(SECONDS_PER_DAY)),
        }
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

pub trait WallClock {
    fn now(&self) -> WallTime;

    fn current_date(&self) -> Date {
        self.now().date
    }
}

/// Seconds since the Unix epoch, once the source has synchronised.
pub trait TimeSource {
    fn unix_time(&self) -> Option<i64>;
}

/// The host's own clock, always considered synchronised.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn unix_time(&self) -> Option<i64> {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        i64::try_from(elapsed.as_secs()).ok()
    }
}

/// Fixed date and time used when no network time is available.
pub struct StaticWallClock {
    time: WallTime,
}

impl StaticWallClock {
    pub fn new(date: Date, time: TimeOfDay) -> Self {
        Self {
            time: WallTime { date, time },
        }
    }
}

impl WallClock for StaticWallClock {
    fn now(&self) -> WallTime {
        self.time
    }
}

pub struct NetworkWallClock<S> {
    source: S,
    utc_offset_secs: i64,
    last_sync: Cell<Option<i64>>,
}

impl<S: TimeSource> NetworkWallClock<S> {
    pub fn new(source: S, utc_offset_secs: i64) -> Self {
        Self {
            source,
            utc_offset_secs,
            last_sync: Cell::new(None),
        }
    }
}

impl<S: TimeSource> WallClock for NetworkWallClock<S> {
    fn now(&self) -> WallTime {
        // Holding the last good reading keeps the date from jumping back and
        // triggering a spurious day rollover while the source resyncs.
        let secs = match self.source.unix_time() {
            Some(secs) => {
                self.last_sync.set(Some(secs));
                secs
            }
            None => {
                log::debug!("time source unavailable, using last reading");
                self.last_sync.get().unwrap_or(0)
            }
        };
        WallTime::from_unix(secs, self.utc_offset_secs)
    }
}

/// Network time if `source` has already synchronised, the static fallback otherwise.
pub fn select_wall_clock<'a, S: TimeSource + 'a>(
    source: Option<S>,
    utc_offset_secs: i64,
    fallback: StaticWallClock,
) -> Box<dyn WallClock + 'a> {
    match source {
        Some(source) if source.unix_time().is_some() => {
            log::info!("Using network time");
            Box::new(NetworkWallClock::new(source, utc_offset_secs))
        }
        _ => {
            log::warn!("No network time, falling back to {}", fallback.time);
            Box::new(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    struct FakeSource(Cell<Option<i64>>);

    impl TimeSource for FakeSource {
        fn unix_time(&self) -> Option<i64> {
            self.0.get()
        }
    }

    fn fallback() -> StaticWallClock {
        StaticWallClock::new(
            "01/01/2025".parse().unwrap(),
            TimeOfDay::new(8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_epoch_is_first_of_january_1970() {
        assert_snapshot!(WallTime::from_unix(0, 0), @"01/01/1970 00:00:00");
    }

    #[test]
    fn test_unix_time_to_local_date() {
        // 2025-01-01T00:00:00Z
        let t = 1_735_689_600;
        assert_snapshot!(WallTime::from_unix(t, 0), @"01/01/2025 00:00:00");
        assert_snapshot!(WallTime::from_unix(t - 1, 0), @"31/12/2024 23:59:59");
        assert_snapshot!(WallTime::from_unix(t, -3_600), @"31/12/2024 23:00:00");
        // 2024 is a leap year
        assert_snapshot!(WallTime::from_unix(t - 307 * 86_400, 0), @"29/02/2024 00:00:00");
    }

    #[test]
    fn test_date_parse_and_display() {
        let date: Date = "2/1/2025".parse().unwrap();
        assert_eq!(date.to_string(), "02/01/2025");
        assert!("32/01/2025".parse::<Date>().is_err());
        assert!("01/13/2025".parse::<Date>().is_err());
        assert!("01-01-2025".parse::<Date>().is_err());
    }

    #[test]
    fn test_time_of_day_parse() {
        let time: TimeOfDay = "07:05:09".parse().unwrap();
        assert_eq!(time.to_string(), "07:05:09");
        assert!("24:00:00".parse::<TimeOfDay>().is_err());
        assert!("12:00".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_unsynchronised_source_selects_static_clock() {
        let clock = select_wall_clock(Some(FakeSource(Cell::new(None))), 0, fallback());
        assert_snapshot!(clock.now(), @"01/01/2025 08:00:00");

        let clock = select_wall_clock(None::<SystemTimeSource>, 0, fallback());
        assert_eq!(clock.current_date(), "01/01/2025".parse::<Date>().unwrap());
    }

    #[test]
    fn test_synchronised_source_selects_network_clock() {
        let source = FakeSource(Cell::new(Some(1_735_732_800)));
        let clock = select_wall_clock(Some(source), 3_600, fallback());
        assert_snapshot!(clock.now(), @"01/01/2025 13:00:00");
    }

    #[test]
    fn test_network_clock_holds_last_reading_when_source_drops() {
        let clock = NetworkWallClock::new(FakeSource(Cell::new(Some(1_735_689_600))), 0);
        assert_eq!(clock.current_date().to_string(), "01/01/2025");

        clock.source.0.set(None);
        assert_eq!(clock.current_date().to_string(), "01/01/2025");
    }
}
