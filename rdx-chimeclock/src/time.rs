//! Time sources and the samples they produce.
//!
//! The update loop never keeps its own notion of elapsed time. Every tick
//! re-reads a `TimeSource`, so scheduler jitter never accumulates into drift.

use anyhow::bail;
use chrono::{Local, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::VecDeque;

/// One reading of the clock, broken into the parts the trigger and the
/// display need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockSample {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    /// `HH:mm:ss.SSS`, 24-hour.
    pub formatted: String,
    /// The instant this sample was taken from.
    pub taken_at: NaiveDateTime,
}

impl ClockSample {
    /// Builds a sample from a wall-clock reading.
    ///
    /// chrono represents a leap second as second 59 with a nanosecond field
    /// past one billion; the millisecond is clamped to 999 in that case.
    pub fn from_datetime(taken_at: NaiveDateTime) -> Self {
        let hour = taken_at.hour();
        let minute = taken_at.minute();
        let second = taken_at.second().min(59);
        let millisecond = (taken_at.nanosecond() / 1_000_000).min(999);
        Self {
            hour,
            minute,
            second,
            millisecond,
            formatted: Self::format(hour, minute, second, millisecond),
            taken_at,
        }
    }

    pub fn format(hour: u32, minute: u32, second: u32, millisecond: u32) -> String {
        format!("{:02}:{:02}:{:02}.{:03}", hour, minute, second, millisecond)
    }
}

/// Anything that can tell the loop what time it is.
pub trait TimeSource: Send {
    /// Reads the current wall-clock time. An error is fatal to the loop.
    fn now(&mut self) -> anyhow::Result<NaiveDateTime>;
}

/// Reads the host's wall clock, in local time or in a fixed IANA zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource {
    timezone: Option<Tz>,
}

impl SystemTimeSource {
    pub fn new(timezone: Option<Tz>) -> Self {
        Self { timezone }
    }

    pub fn local() -> Self {
        Self { timezone: None }
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&mut self) -> anyhow::Result<NaiveDateTime> {
        Ok(match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        })
    }
}

/// Replays a fixed sequence of instants, one per read.
///
/// Reading past the end of the script fails, which ends the loop the same
/// way a broken system clock would.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTimeSource {
    script: VecDeque<NaiveDateTime>,
}

impl ScriptedTimeSource {
    pub fn new(script: impl IntoIterator<Item = NaiveDateTime>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl TimeSource for ScriptedTimeSource {
    fn now(&mut self) -> anyhow::Result<NaiveDateTime> {
        match self.script.pop_front() {
            Some(instant) => Ok(instant),
            None => bail!("scripted time source is exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 17)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
    }

    fn has_clock_shape(text: &str) -> bool {
        let bytes = text.as_bytes();
        bytes.len() == 12
            && bytes[2] == b':'
            && bytes[5] == b':'
            && bytes[8] == b'.'
            && [0, 1, 3, 4, 6, 7, 9, 10, 11]
                .iter()
                .all(|&i| bytes[i].is_ascii_digit())
    }

    #[test]
    fn pads_every_field() {
        let sample = ClockSample::from_datetime(at(7, 5, 3, 9));
        assert_eq!(sample.formatted, "07:05:03.009");
        assert_eq!(
            (sample.hour, sample.minute, sample.second, sample.millisecond),
            (7, 5, 3, 9)
        );
    }

    #[test]
    fn formats_extremes_of_the_day() {
        assert_eq!(ClockSample::from_datetime(at(0, 0, 0, 0)).formatted, "00:00:00.000");
        assert_eq!(
            ClockSample::from_datetime(at(23, 59, 59, 999)).formatted,
            "23:59:59.999"
        );
    }

    #[test]
    fn every_millisecond_of_a_minute_keeps_the_shape() {
        for s in 0..60 {
            for ms in (0..1000).step_by(37) {
                let sample = ClockSample::from_datetime(at(13, 42, s, ms));
                assert!(has_clock_shape(&sample.formatted), "{}", sample.formatted);
            }
        }
    }

    #[test]
    fn leap_second_is_clamped() {
        let leap = NaiveDate::from_ymd_opt(2016, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 1_500)
            .unwrap();
        let sample = ClockSample::from_datetime(leap);
        assert_eq!(sample.second, 59);
        assert_eq!(sample.millisecond, 999);
        assert_eq!(sample.formatted, "23:59:59.999");
    }

    #[test]
    fn scripted_source_replays_then_fails() {
        let mut source = ScriptedTimeSource::new([at(1, 2, 3, 4), at(1, 2, 3, 5)]);
        assert_eq!(source.now().unwrap(), at(1, 2, 3, 4));
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.now().unwrap(), at(1, 2, 3, 5));
        assert!(source.now().is_err());
    }

    #[test]
    fn zoned_source_follows_the_zone() {
        let mut utc = SystemTimeSource::new(Some(chrono_tz::UTC));
        let before = Utc::now().naive_utc();
        let read = utc.now().unwrap();
        let after = Utc::now().naive_utc();
        assert!(before <= read && read <= after);
    }
}
