//! Defines all public event types broadcast by the Chimeclock engine.
//!
//! Hosts subscribe to these streams to render, log, or react; none of them
//! feed back into the update loop.

use crate::common::{ChimeKind, Orientation};
use crate::time::ClockSample;
use std::sync::Arc;
use tokio::time::Instant;

/// Fired for every chime that actually played.
#[derive(Debug, Clone)]
pub struct ChimeEvent {
    pub kind: ChimeKind,
    /// The sample whose boundary rang the chime.
    pub sample: Arc<ClockSample>,
}

/// Events related to the lifecycle and state of the engine itself.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemEvent {
    /// Fired once when the update loop begins.
    ClockStarted { timestamp: Instant },
    /// Fired once when the update loop has exited and released its chimes.
    ClockStopped,
    /// A chime was due but its resource was never provisioned.
    ChimeUnavailable { kind: ChimeKind },
    /// A chime was due but its resource failed to play.
    ChimePlaybackFailed { kind: ChimeKind, reason: String },
    /// The host reported a new orientation.
    OrientationChanged { orientation: Orientation },
}
