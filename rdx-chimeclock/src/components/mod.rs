//! Contains the building blocks the update loop is assembled from.
//!
//! The trigger decides when a chime is due; the playback resources make the
//! sound. The `ClockLoop` owns one of each and drives them on every tick.

pub mod playback;
pub mod trigger;
