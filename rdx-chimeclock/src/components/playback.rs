//! Playback resources for the two chimes.
//!
//! Resources are created once by `ChimeBank::acquire` when the clock starts
//! and released by `ChimeBank::release` (or on drop) when it stops. A chime
//! whose resource could not be created is simply skipped.

use crate::common::ChimeKind;
use crate::config::ChimesConfig;
use anyhow::{bail, Context};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{debug, trace, warn};

/// A single sound that can be started and eventually released.
pub trait Playback: Send {
    /// Starts the sound. Must not block for the length of the sound.
    fn play(&mut self) -> anyhow::Result<()>;

    /// Frees whatever the resource holds. Called once, when the bank is released.
    fn release(&mut self) {}
}

/// Plays an audio asset through an external player process.
#[derive(Debug)]
pub struct CommandPlayback {
    program: String,
    args: Vec<String>,
    asset: PathBuf,
    child: Option<Child>,
}

impl CommandPlayback {
    /// Prepares `player` (program and leading arguments) to play `asset`.
    /// Fails if the player is empty or the asset does not exist.
    pub fn new(player: &[String], asset: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let (program, args) = player.split_first().context("player command is empty")?;
        let asset = asset.into();
        if !asset.is_file() {
            bail!("chime asset {} not found", asset.display());
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            asset,
            child: None,
        })
    }

    pub fn asset(&self) -> &Path {
        &self.asset
    }

    /// Whether the previously started sound is still running.
    pub fn is_playing(&mut self) -> bool {
        let running = match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        };
        if !running {
            self.child = None;
        }
        running
    }
}

impl Playback for CommandPlayback {
    fn play(&mut self) -> anyhow::Result<()> {
        // A player that is already sounding keeps sounding.
        if self.is_playing() {
            trace!("{} still playing, start ignored", self.asset.display());
            return Ok(());
        }
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.asset)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start player `{}`", self.program))?;
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            child.kill().ok();
            child.wait().ok();
        }
    }
}

/// Rings the terminal bell.
#[derive(Debug, Clone, Copy)]
pub struct BellPlayback {
    strikes: usize,
}

impl BellPlayback {
    pub fn new(strikes: usize) -> Self {
        Self { strikes }
    }

    /// Three strikes for the long chime, one for the short.
    pub fn for_kind(kind: ChimeKind) -> Self {
        match kind {
            ChimeKind::Long => Self::new(3),
            ChimeKind::Short => Self::new(1),
        }
    }

    pub fn strikes(&self) -> usize {
        self.strikes
    }
}

impl Playback for BellPlayback {
    fn play(&mut self) -> anyhow::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(&vec![0x07; self.strikes])?;
        out.flush()?;
        Ok(())
    }
}

/// What happened when a chime was asked to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChimeOutcome {
    Played,
    /// The resource was never provisioned, or has been released.
    Unavailable,
    Failed(String),
}

/// The long and short chime resources, owned by the update loop.
pub struct ChimeBank {
    long: Option<Box<dyn Playback>>,
    short: Option<Box<dyn Playback>>,
    released: bool,
}

impl ChimeBank {
    pub fn new(long: Option<Box<dyn Playback>>, short: Option<Box<dyn Playback>>) -> Self {
        Self {
            long,
            short,
            released: false,
        }
    }

    /// A bank with nothing provisioned; every chime is a no-op.
    pub fn silent() -> Self {
        Self::new(None, None)
    }

    /// Creates both resources from configuration.
    ///
    /// Without a player command the chimes ring the terminal bell. With one,
    /// a chime whose asset is missing is left unprovisioned.
    pub fn acquire(config: &ChimesConfig) -> Self {
        let bank = Self::new(
            provision(config, ChimeKind::Long),
            provision(config, ChimeKind::Short),
        );
        debug!(
            "Chime bank acquired (long: {}, short: {}).",
            bank.is_provisioned(ChimeKind::Long),
            bank.is_provisioned(ChimeKind::Short)
        );
        bank
    }

    pub fn is_provisioned(&self, kind: ChimeKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Plays `kind`. Missing or failing resources never stop the clock.
    pub fn play(&mut self, kind: ChimeKind) -> ChimeOutcome {
        match self.slot_mut(kind) {
            Some(playback) => match playback.play() {
                Ok(()) => ChimeOutcome::Played,
                Err(e) => ChimeOutcome::Failed(format!("{:#}", e)),
            },
            None => ChimeOutcome::Unavailable,
        }
    }

    /// Releases both resources. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        for kind in ChimeKind::ALL {
            if let Some(mut playback) = self.slot_mut(kind).take() {
                playback.release();
            }
        }
        self.released = true;
        debug!("Chime bank released.");
    }

    fn slot(&self, kind: ChimeKind) -> &Option<Box<dyn Playback>> {
        match kind {
            ChimeKind::Long => &self.long,
            ChimeKind::Short => &self.short,
        }
    }

    fn slot_mut(&mut self, kind: ChimeKind) -> &mut Option<Box<dyn Playback>> {
        match kind {
            ChimeKind::Long => &mut self.long,
            ChimeKind::Short => &mut self.short,
        }
    }
}

impl Drop for ChimeBank {
    fn drop(&mut self) {
        self.release();
    }
}

fn provision(config: &ChimesConfig, kind: ChimeKind) -> Option<Box<dyn Playback>> {
    if !config.enabled {
        return None;
    }
    let Some(player) = &config.player else {
        return Some(Box::new(BellPlayback::for_kind(kind)));
    };
    let asset = match kind {
        ChimeKind::Long => &config.long,
        ChimeKind::Short => &config.short,
    };
    match CommandPlayback::new(player, asset) {
        Ok(playback) => Some(Box::new(playback)),
        Err(e) => {
            warn!("The {} chime is unavailable: {:#}", kind, e);
            None
        }
    }
}
