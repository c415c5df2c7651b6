//! Contains common, primitive types shared across the engine.
//!
//! These small enums name the two things the rest of the crate branches on:
//! which chime is being played, and which way the host screen is turned.

use serde::Deserialize;
use std::fmt;

/// Identifies one of the two chime cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChimeKind {
    /// Played at every ten-minute boundary.
    Long,
    /// Played during the closing seconds of minutes ending in 9.
    Short,
}

impl ChimeKind {
    pub const ALL: [ChimeKind; 2] = [ChimeKind::Long, ChimeKind::Short];

    pub fn label(self) -> &'static str {
        match self {
            ChimeKind::Long => "long",
            ChimeKind::Short => "short",
        }
    }
}

impl fmt::Display for ChimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The orientation reported by the host on each layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Returns the orientation after a quarter turn.
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("portrait"),
            Orientation::Landscape => f.write_str("landscape"),
        }
    }
}
