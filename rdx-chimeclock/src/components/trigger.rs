//! Decides which chimes a sample should ring.

use crate::common::ChimeKind;
use crate::time::ClockSample;

/// Seconds, within a qualifying minute, that ring the short chime.
pub const SHORT_CHIME_SECONDS: [u32; 6] = [50, 55, 56, 57, 58, 59];

/// Minutes whose closing seconds ring the short chime.
pub const SHORT_CHIME_MINUTES: [u32; 6] = [9, 19, 29, 39, 49, 59];

/// The long chime rings when the minute is a multiple of this.
pub const LONG_CHIME_EVERY_MINUTES: u32 = 10;

/// Which chimes a single evaluation fired. Long always precedes short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChimeDecision {
    pub long: bool,
    pub short: bool,
}

impl ChimeDecision {
    pub fn is_silent(&self) -> bool {
        !self.long && !self.short
    }

    /// The fired chimes in play order.
    pub fn kinds(&self) -> impl Iterator<Item = ChimeKind> {
        let fired = [self.long, self.short];
        ChimeKind::ALL
            .into_iter()
            .zip(fired)
            .filter_map(|(kind, fired)| fired.then_some(kind))
    }
}

/// The last-fired markers of the chime trigger.
///
/// A marker only moves when its chime fires, so it moves at most once per
/// distinct minute or second value and an unchanged sample never fires twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChimeState {
    last_fired_minute: Option<u32>,
    last_fired_second: Option<u32>,
}

impl ChimeState {
    /// A state where nothing has fired yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fired_minute(&self) -> Option<u32> {
        self.last_fired_minute
    }

    pub fn last_fired_second(&self) -> Option<u32> {
        self.last_fired_second
    }

    /// Checks `sample` against both boundaries and records what fired.
    pub fn evaluate(&mut self, sample: &ClockSample) -> ChimeDecision {
        let mut decision = ChimeDecision::default();

        let minute = sample.minute;
        if minute % LONG_CHIME_EVERY_MINUTES == 0 && self.last_fired_minute != Some(minute) {
            self.last_fired_minute = Some(minute);
            decision.long = true;
        }

        let second = sample.second;
        if SHORT_CHIME_SECONDS.contains(&second)
            && SHORT_CHIME_MINUTES.contains(&minute)
            && self.last_fired_second != Some(second)
        {
            self.last_fired_second = Some(second);
            decision.short = true;
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(minute: u32, second: u32) -> ClockSample {
        let at = NaiveDate::from_ymd_opt(2025, 5, 17)
            .unwrap()
            .and_hms_milli_opt(14, minute, second, 0)
            .unwrap();
        ClockSample::from_datetime(at)
    }

    #[test]
    fn long_chime_fires_once_per_ten_minute_boundary() {
        let mut state = ChimeState::new();
        assert!(state.evaluate(&sample(10, 0)).long);
        for second in 1..60 {
            assert!(!state.evaluate(&sample(10, second)).long);
        }
        assert_eq!(state.last_fired_minute(), Some(10));
    }

    #[test]
    fn short_chime_fires_in_closing_seconds_of_minute_nine() {
        let mut state = ChimeState::new();
        let fired = state.evaluate(&sample(9, 58));
        assert_eq!(fired, ChimeDecision { long: false, short: true });
        assert!(state.evaluate(&sample(9, 58)).is_silent());
        assert!(state.evaluate(&sample(9, 59)).short);
        assert_eq!(state.last_fired_second(), Some(59));
    }

    #[test]
    fn off_boundary_minute_is_silent() {
        let mut state = ChimeState::new();
        assert!(state.evaluate(&sample(15, 57)).is_silent());
        assert_eq!(state, ChimeState::new());
    }

    #[test]
    fn seconds_outside_the_set_are_silent() {
        let mut state = ChimeState::new();
        for second in (0..50).chain(51..55) {
            assert!(state.evaluate(&sample(19, second)).is_silent(), "second {}", second);
        }
    }

    #[test]
    fn unchanged_sample_is_idempotent() {
        let mut state = ChimeState::new();
        state.evaluate(&sample(0, 55));
        let after_first = state;
        for _ in 0..5 {
            assert!(state.evaluate(&sample(0, 55)).is_silent());
        }
        assert_eq!(state, after_first);
    }

    #[test]
    fn top_of_the_hour_rings_the_long_chime() {
        let mut state = ChimeState::new();
        assert!(state.evaluate(&sample(0, 0)).long);
    }

    #[test]
    fn full_hour_rings_each_boundary_once() {
        let mut state = ChimeState::new();
        let mut long = Vec::new();
        let mut short = Vec::new();
        for minute in 0..60 {
            for second in 0..60 {
                // Several ticks per second, as the real loop produces.
                for _ in 0..3 {
                    let fired = state.evaluate(&sample(minute, second));
                    if fired.long {
                        long.push(minute);
                    }
                    if fired.short {
                        short.push((minute, second));
                    }
                }
            }
        }
        assert_eq!(long, vec![0, 10, 20, 30, 40, 50]);
        assert_eq!(short.len(), SHORT_CHIME_MINUTES.len() * SHORT_CHIME_SECONDS.len());
        for minute in SHORT_CHIME_MINUTES {
            for second in SHORT_CHIME_SECONDS {
                assert!(short.contains(&(minute, second)));
            }
        }
    }

    #[test]
    fn decision_kinds_are_in_play_order() {
        let both = ChimeDecision { long: true, short: true };
        assert_eq!(both.kinds().collect::<Vec<_>>(), vec![ChimeKind::Long, ChimeKind::Short]);
        assert_eq!(ChimeDecision::default().kinds().count(), 0);
    }
}
