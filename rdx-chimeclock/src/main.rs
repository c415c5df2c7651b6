use anyhow::Result;
use chimeclock::config::DEFAULT_CONFIG_FILE;
use chimeclock::prelude::*;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging. Stdout belongs to the clock face.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // 2. Load the configuration, falling back to defaults.
    let config = ChimeClockConfig::load(DEFAULT_CONFIG_FILE)?;

    // 3. Create the ChimeClockEngine instance.
    let engine = ChimeClockEngine::new(config);

    // 4. Spawn the tasks that draw the clock and log what it does.
    spawn_renderer(&engine);
    spawn_event_listeners(&engine);

    // 5. Run the engine until Ctrl+C.
    engine.run().await?;

    Ok(())
}

/// Redraws the clock face whenever the sample or the orientation changes.
fn spawn_renderer(engine: &ChimeClockEngine) {
    let mut samples = engine.subscribe_samples();
    let mut orientation = engine.subscribe_orientation();
    let engine = engine.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = samples.changed() => if changed.is_err() { break },
                changed = orientation.changed() => if changed.is_err() { break },
            }
            let Some(sample) = engine.current_sample() else {
                continue;
            };
            // Every pass computes its layout afresh.
            let frame = Frame::compose(&engine.layout(), &sample);
            if let Err(e) = frame.paint(&mut std::io::stdout().lock()) {
                error!("Failed to draw the clock: {}", e);
                break;
            }
        }
    });
}

/// Spawns tasks that log the chime and system event streams.
fn spawn_event_listeners(engine: &ChimeClockEngine) {
    let mut chime_rx = engine.subscribe_chime_events();
    tokio::spawn(async move {
        while let Ok(event) = chime_rx.recv().await {
            info!("[CHIME] => {} chime at {}", event.kind, event.sample.formatted);
        }
    });

    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("[SYSTEM] => {:?}", event);
        }
    });
}
