//! Defines all configuration structures for the Chimeclock engine.
//!
//! These structs are deserialized from an optional TOML file through the
//! `config` crate. Every field has a default, so a missing file or a partial
//! file yields a working clock.

use crate::common::Orientation;
use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The conventional configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "chimeclock.toml";

/// The top-level configuration for the `ChimeClockEngine`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChimeClockConfig {
    /// The IANA zone the clock displays (e.g., "Europe/Rome").
    /// When absent, the host's local time zone is used.
    pub timezone: Option<Tz>,

    /// Controls how long the loop sleeps between ticks.
    pub schedule: ScheduleConfig,

    /// The chime playback resources.
    pub chimes: ChimesConfig,

    /// Host-reported layout inputs.
    pub layout: LayoutConfig,
}

/// Sub-second refresh policy of the update loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay between ticks while the current second is still young.
    pub fine_interval_ms: u64,
    /// Millisecond-within-second from which the loop aims for the next second instead.
    pub boundary_threshold_ms: u32,
    /// How far past the next second boundary the loop wakes up.
    pub boundary_overshoot_ms: u64,
}

/// Where the chime sounds come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChimesConfig {
    /// When false, neither chime is provisioned.
    pub enabled: bool,
    /// External player invocation, e.g. `["aplay", "-q"]`. The asset path is
    /// appended as the last argument. Without a player the terminal bell rings.
    pub player: Option<Vec<String>>,
    /// Audio asset for the ten-minute chime.
    pub long: PathBuf,
    /// Audio asset for the closing-seconds chime.
    pub short: PathBuf,
}

/// Inputs the host supplies for each layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// The orientation reported before the host says otherwise.
    pub orientation: Orientation,
    /// Height of the status bar in dp, added to the portrait top padding.
    pub status_bar_inset: f32,
}

impl ChimeClockConfig {
    /// Loads the configuration from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .context("failed to parse configuration")
    }
}

impl ScheduleConfig {
    /// Computes how long to wait after a tick that observed `millisecond`.
    ///
    /// Early in a second the loop refreshes at the fine interval; close to the
    /// end it sleeps until just past the next second so the change of second
    /// lands cleanly.
    pub fn next_delay(&self, millisecond: u32) -> Duration {
        if millisecond < self.boundary_threshold_ms {
            Duration::from_millis(self.fine_interval_ms)
        } else {
            let remaining = 1000u64.saturating_sub(u64::from(millisecond));
            Duration::from_millis(remaining + self.boundary_overshoot_ms)
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            fine_interval_ms: 10,
            boundary_threshold_ms: 990,
            boundary_overshoot_ms: 10,
        }
    }
}

impl Default for ChimesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            player: None,
            long: PathBuf::from("assets/beep.wav"),
            short: PathBuf::from("assets/beep_short.wav"),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            status_bar_inset: 24.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_fine_inside_the_second() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.next_delay(0), Duration::from_millis(10));
        assert_eq!(schedule.next_delay(500), Duration::from_millis(10));
        assert_eq!(schedule.next_delay(989), Duration::from_millis(10));
    }

    #[test]
    fn delay_aims_past_the_next_second() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.next_delay(990), Duration::from_millis(20));
        assert_eq!(schedule.next_delay(995), Duration::from_millis(15));
        assert_eq!(schedule.next_delay(999), Duration::from_millis(11));
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = ChimeClockConfig::from_toml_str("").unwrap();
        assert!(config.timezone.is_none());
        assert_eq!(config.schedule, ScheduleConfig::default());
        assert_eq!(config.chimes, ChimesConfig::default());
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = ChimeClockConfig::load("does/not/exist/chimeclock.toml").unwrap();
        assert!(config.chimes.enabled);
        assert_eq!(config.layout.orientation, Orientation::Portrait);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = ChimeClockConfig::from_toml_str(
            r#"
            timezone = "Europe/Rome"

            [chimes]
            player = ["aplay", "-q"]
            long = "sounds/long.wav"

            [layout]
            orientation = "landscape"
            "#,
        )
        .unwrap();

        assert_eq!(config.timezone, Some(chrono_tz::Europe::Rome));
        assert_eq!(
            config.chimes.player,
            Some(vec!["aplay".to_string(), "-q".to_string()])
        );
        assert_eq!(config.chimes.long, PathBuf::from("sounds/long.wav"));
        assert_eq!(config.chimes.short, PathBuf::from("assets/beep_short.wav"));
        assert_eq!(config.layout.orientation, Orientation::Landscape);
        assert_eq!(config.layout.status_bar_inset, 24.0);
        assert_eq!(config.schedule.fine_interval_ms, 10);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert!(ChimeClockConfig::from_toml_str(r#"timezone = "Mars/Olympus""#).is_err());
    }
}
