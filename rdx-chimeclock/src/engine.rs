//! The update loop and the engine that hosts it.

use crate::common::{ChimeKind, Orientation};
use crate::components::playback::{ChimeBank, ChimeOutcome};
use crate::components::trigger::ChimeState;
use crate::config::{ChimeClockConfig, ScheduleConfig};
use crate::events::{ChimeEvent, SystemEvent};
use crate::layout::DisplayConfig;
use crate::time::{ClockSample, SystemTimeSource, TimeSource};
use crate::ENGINE_NAME;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// The result of one iteration of the update loop.
#[derive(Debug, Clone)]
pub struct Tick {
    pub sample: ClockSample,
    /// The chimes that were due this tick, in play order, and how each went.
    pub chimes: Vec<(ChimeKind, ChimeOutcome)>,
    /// How long to wait before the next tick.
    pub delay: Duration,
}

/// The single-step core of the clock.
///
/// Owns the time source, the chime trigger state and the playback
/// resources. Nothing else mutates them, so no locking is needed, and tests
/// can step it one `tick()` at a time with a scripted source.
pub struct ClockLoop<T: TimeSource> {
    source: T,
    state: ChimeState,
    chimes: ChimeBank,
    schedule: ScheduleConfig,
}

impl<T: TimeSource> ClockLoop<T> {
    /// Creates a loop with nothing fired yet.
    pub fn new(source: T, chimes: ChimeBank, schedule: ScheduleConfig) -> Self {
        Self {
            source,
            state: ChimeState::new(),
            chimes,
            schedule,
        }
    }

    /// Samples the clock, rings whatever is due, and schedules the next tick.
    pub fn tick(&mut self) -> anyhow::Result<Tick> {
        let now = self.source.now().context("failed to read the clock")?;
        let sample = ClockSample::from_datetime(now);
        let chimes = self
            .state
            .evaluate(&sample)
            .kinds()
            .map(|kind| (kind, self.chimes.play(kind)))
            .collect();
        let delay = self.schedule.next_delay(sample.millisecond);
        Ok(Tick {
            sample,
            chimes,
            delay,
        })
    }

    pub fn state(&self) -> &ChimeState {
        &self.state
    }

    /// Releases the chime resources. Further chimes are unavailable.
    pub fn release(&mut self) {
        self.chimes.release();
    }
}

/// Controls a running update loop.
///
/// `ChimeClockEngine::spawn` is the create half; `stop` is the destroy half.
/// Dropping the handle also stops the loop, since its shutdown channel closes.
pub struct ClockHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl ClockHandle {
    /// A sender that stops the loop when anything is sent on it.
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and waits for it to release its resources.
    pub async fn stop(self) -> anyhow::Result<()> {
        self.shutdown_tx.send(()).ok();
        self.join().await
    }

    /// Waits for the loop to end on its own or through a shutdown sender.
    pub async fn join(self) -> anyhow::Result<()> {
        let Self { shutdown_tx, task } = self;
        let result = task.await.context("clock task did not complete");
        drop(shutdown_tx);
        result?
    }
}

/// The main Chimeclock engine.
///
/// Holds the configuration, the host-reported orientation and the channels
/// the update loop publishes on. Cheap to clone; every clone is a handle to
/// the same channels.
#[derive(Clone)]
pub struct ChimeClockEngine {
    config: Arc<ChimeClockConfig>,
    sample_sender: Arc<watch::Sender<Option<Arc<ClockSample>>>>,
    orientation_sender: Arc<watch::Sender<Orientation>>,
    tick_sender: broadcast::Sender<Arc<ClockSample>>,
    chime_event_sender: broadcast::Sender<ChimeEvent>,
    system_event_sender: broadcast::Sender<SystemEvent>,
}

// Core implementation block for internal logic.
impl ChimeClockEngine {
    /// Creates a new `ChimeClockEngine` with the given configuration.
    pub fn new(config: ChimeClockConfig) -> Self {
        const CHANNEL_CAPACITY: usize = 256;
        let (tick_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (chime_event_sender, _) = broadcast::channel(64);
        let (system_event_sender, _) = broadcast::channel(64);
        let (sample_sender, _) = watch::channel(None);
        let (orientation_sender, _) = watch::channel(config.layout.orientation);

        Self {
            config: Arc::new(config),
            sample_sender: Arc::new(sample_sender),
            orientation_sender: Arc::new(orientation_sender),
            tick_sender,
            chime_event_sender,
            system_event_sender,
        }
    }

    /// Runs the clock until a Ctrl+C signal is received.
    ///
    /// This method will:
    /// 1. Acquire the chime resources and spawn the update loop.
    /// 2. Spawn a task that turns Ctrl+C into a shutdown signal.
    /// 3. Wait for the loop to exit and report how it ended.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("{} starting up...", ENGINE_NAME);
        let handle = self.spawn();

        let shutdown_tx = handle.shutdown_sender();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown signal received. Stopping the clock...");
                    shutdown_tx.send(()).ok();
                }
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
        });

        info!(
            "Clock running in {} orientation. Press Ctrl+C to shut down.",
            self.orientation()
        );
        handle.join().await?;
        info!("{} has shut down.", ENGINE_NAME);
        Ok(())
    }

    #[doc(hidden)]
    async fn update_loop<T: TimeSource>(
        self,
        mut clock_loop: ClockLoop<T>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        self.system_event_sender
            .send(SystemEvent::ClockStarted {
                timestamp: tokio::time::Instant::now(),
            })
            .ok();

        let outcome = loop {
            match shutdown_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break Ok(()),
            }
            let tick = match clock_loop.tick() {
                Ok(tick) => tick,
                Err(e) => {
                    error!("Update loop failed: {:#}", e);
                    break Err(e);
                }
            };
            let delay = tick.delay;
            self.publish(tick);
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }
        };

        clock_loop.release();
        self.system_event_sender.send(SystemEvent::ClockStopped).ok();
        info!("Update loop stopped.");
        outcome
    }

    #[doc(hidden)]
    fn publish(&self, tick: Tick) {
        let sample = Arc::new(tick.sample);
        trace!("Tick at {} (next in {:?}).", sample.formatted, tick.delay);
        for (kind, outcome) in tick.chimes {
            match outcome {
                ChimeOutcome::Played => {
                    debug!("Rang the {} chime at {}.", kind, sample.formatted);
                    self.chime_event_sender
                        .send(ChimeEvent {
                            kind,
                            sample: sample.clone(),
                        })
                        .ok();
                }
                ChimeOutcome::Unavailable => {
                    debug!("The {} chime was due at {} but is unavailable.", kind, sample.formatted);
                    self.system_event_sender
                        .send(SystemEvent::ChimeUnavailable { kind })
                        .ok();
                }
                ChimeOutcome::Failed(reason) => {
                    warn!("The {} chime failed to play: {}", kind, reason);
                    self.system_event_sender
                        .send(SystemEvent::ChimePlaybackFailed { kind, reason })
                        .ok();
                }
            }
        }
        self.tick_sender.send(sample.clone()).ok();
        self.sample_sender.send_replace(Some(sample));
    }
}

// Public API implementation block.
impl ChimeClockEngine {
    /// Acquires the configured chimes and starts the update loop on the wall clock.
    pub fn spawn(&self) -> ClockHandle {
        let source = SystemTimeSource::new(self.config.timezone);
        let chimes = ChimeBank::acquire(&self.config.chimes);
        self.spawn_with(source, chimes)
    }

    /// Starts the update loop with the given time source and chime resources.
    ///
    /// The loop owns `chimes` from here on and releases them on every exit path.
    pub fn spawn_with<T>(&self, source: T, chimes: ChimeBank) -> ClockHandle
    where
        T: TimeSource + 'static,
    {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let clock_loop = ClockLoop::new(source, chimes, self.config.schedule);
        let engine = self.clone();
        let task = tokio::spawn(engine.update_loop(clock_loop, shutdown_rx));
        ClockHandle { shutdown_tx, task }
    }

    pub fn config(&self) -> &ChimeClockConfig {
        &self.config
    }

    /// Records the orientation the host reports. Takes effect on the next layout pass.
    pub fn set_orientation(&self, orientation: Orientation) {
        let previous = self.orientation_sender.send_replace(orientation);
        if previous != orientation {
            info!("Orientation changed to {}.", orientation);
            self.system_event_sender
                .send(SystemEvent::OrientationChanged { orientation })
                .ok();
        }
    }

    /// Turns the reported orientation a quarter turn and returns the new one.
    pub fn rotate(&self) -> Orientation {
        let next = self.orientation().rotated();
        self.set_orientation(next);
        next
    }

    pub fn orientation(&self) -> Orientation {
        *self.orientation_sender.borrow()
    }

    /// Computes a fresh layout for the current orientation.
    pub fn layout(&self) -> DisplayConfig {
        DisplayConfig::for_orientation(self.orientation(), &self.config.layout)
    }

    /// The most recent sample, once the loop has ticked.
    pub fn current_sample(&self) -> Option<Arc<ClockSample>> {
        self.sample_sender.borrow().clone()
    }

    /// Subscribes to the latest sample. Slow readers skip samples instead of lagging.
    pub fn subscribe_samples(&self) -> watch::Receiver<Option<Arc<ClockSample>>> {
        self.sample_sender.subscribe()
    }

    /// Subscribes to orientation reports.
    pub fn subscribe_orientation(&self) -> watch::Receiver<Orientation> {
        self.orientation_sender.subscribe()
    }

    /// Subscribes to every tick's sample.
    pub fn subscribe_ticks(&self) -> broadcast::Receiver<Arc<ClockSample>> {
        self.tick_sender.subscribe()
    }

    /// Subscribes to the `ChimeEvent` stream.
    pub fn subscribe_chime_events(&self) -> broadcast::Receiver<ChimeEvent> {
        self.chime_event_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }
}
