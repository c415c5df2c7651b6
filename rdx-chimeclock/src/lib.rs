//! # Chimeclock
//!
//! A millisecond wall clock with audible chimes at ten-minute boundaries.
//!
//! Chimeclock samples the wall clock many times per second, formats each
//! sample as `HH:mm:ss.SSS`, and rings a chime when the time crosses one of
//! its boundaries. The layout of the host screen adapts to the orientation
//! the host reports.
//!
//! ## Core Concepts
//!
//! - **ClockLoop**: The single-step core. Each `tick()` reads a `TimeSource`,
//!   produces a `ClockSample`, evaluates the chime trigger, and computes the
//!   delay until the next tick.
//! - **Chime Trigger**: A small state machine gated on last-fired markers, so
//!   each boundary plays at most once.
//! - **ChimeBank**: The two playback resources (long and short chime),
//!   acquired when the clock starts and released when it stops.
//! - **Event-Driven**: The engine publishes samples, chimes and lifecycle
//!   events on channels; hosts subscribe to render and react.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chimeclock::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Load the configuration (defaults when the file is absent).
//!     let config = ChimeClockConfig::load("chimeclock.toml")?;
//!
//!     // 2. Create the engine.
//!     let engine = ChimeClockEngine::new(config);
//!
//!     // 3. Subscribe to chimes before starting the clock.
//!     let mut chimes = engine.subscribe_chime_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = chimes.recv().await {
//!             println!("{:?} chime at {}", event.kind, event.sample.formatted);
//!         }
//!     });
//!
//!     // 4. Run the clock. It will shut down on Ctrl+C.
//!     engine.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Chime Engine";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod layout;
pub mod time;
pub mod view;

/// A prelude module for easy importing of the most common Chimeclock types.
pub mod prelude {
    pub use crate::common::{ChimeKind, Orientation};
    pub use crate::components::playback::{ChimeBank, ChimeOutcome, Playback};
    pub use crate::components::trigger::{ChimeDecision, ChimeState};
    pub use crate::config::ChimeClockConfig;
    pub use crate::engine::{ChimeClockEngine, ClockHandle, ClockLoop, Tick};
    pub use crate::events::{ChimeEvent, SystemEvent};
    pub use crate::layout::DisplayConfig;
    pub use crate::time::{ClockSample, ScriptedTimeSource, SystemTimeSource, TimeSource};
    pub use crate::view::Frame;
}
