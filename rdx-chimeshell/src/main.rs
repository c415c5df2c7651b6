use anyhow::Result;
use chimeclock::config::DEFAULT_CONFIG_FILE;
use chimeclock::prelude::*;
use chimeclock::view::LOGO;
use chimeclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use colored::Colorize;
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct ShellHighlighter;

impl Highlighter for ShellHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Show,
    Orient(Orientation),
    Rotate,
    Ticks(bool),
    Help,
    Exit,
    Empty,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let args = line.split_whitespace().collect::<Vec<_>>();
        match args.as_slice() {
            [] => Command::Empty,
            ["status"] => Command::Status,
            ["show"] => Command::Show,
            ["portrait"] => Command::Orient(Orientation::Portrait),
            ["landscape"] => Command::Orient(Orientation::Landscape),
            ["rotate"] => Command::Rotate,
            ["start", "ticks"] => Command::Ticks(true),
            ["stop", "ticks"] => Command::Ticks(false),
            ["help"] => Command::Help,
            ["exit"] | ["quit"] => Command::Exit,
            _ => Command::Unknown(line.trim().to_string()),
        }
    }
}

fn print_banner() {
    println!("{}", LOGO.cyan());

    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );

    println!("{}", "-----------------------------------------------------------------".dimmed());

    let license_blurb = "
    This software is provided 'as is', without warranty of any kind.
    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.
    ";

    println!("{}", version_string);
    println!("{}", license_blurb.dimmed());

    println!("{}", "-----------------------------------------------------------------".dimmed());
}

fn print_help() {
    println!("Available commands:");
    println!("  status                - Shows the current time, orientation and layout.");
    println!("  show                  - Draws the clock screen once.");
    println!("  portrait | landscape  - Reports a new orientation to the clock.");
    println!("  rotate                - Turns the reported orientation a quarter turn.");
    println!("  start ticks           - Prints the time once per second.");
    println!("  stop ticks            - Stops printing the time.");
    println!("  exit                  - Stops the clock and quits the shell.");
}

fn print_status(engine: &ChimeClockEngine) {
    let layout = engine.layout();
    match engine.current_sample() {
        Some(sample) => println!("--> Time:        {}", sample.formatted.bold()),
        None => println!("--> Time:        (no tick yet)"),
    }
    println!("--> Orientation: {}", layout.orientation);
    println!(
        "--> Layout:      font {}sp, image {}dp, top padding {}dp",
        layout.font_size, layout.image_height, layout.image_padding.top
    );
}

fn print_frame(engine: &ChimeClockEngine) {
    match engine.current_sample() {
        Some(sample) => {
            let frame = Frame::compose(&engine.layout(), &sample);
            for line in frame.logo_lines() {
                println!("{}", line.cyan());
            }
            for line in frame.clock_lines() {
                println!("{}", line.bold());
            }
        }
        None => println!("--> The clock has not ticked yet."),
    }
}

/// Spawns several tasks, each subscribing to a different event stream from the engine.
fn spawn_event_listeners(engine: &ChimeClockEngine, is_listening_to_ticks: Arc<AtomicBool>) {
    // System Event Listener
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            println!("\n<-- [SYSTEM EVENT] {:?}\n>> ", event);
        }
    });

    // Chime Listener
    let mut chime_rx = engine.subscribe_chime_events();
    tokio::spawn(async move {
        while let Ok(event) = chime_rx.recv().await {
            println!("\n<-- [CHIME] {} chime at {}\n>> ", event.kind, event.sample.formatted);
        }
    });

    // Tick Listener (controlled by the shared flag), at most once per second.
    let mut sample_rx = engine.subscribe_samples();
    tokio::spawn(async move {
        let mut last_second = None;
        while sample_rx.changed().await.is_ok() {
            let Some(sample) = sample_rx.borrow_and_update().clone() else {
                continue;
            };
            if last_second == Some(sample.second) {
                continue;
            }
            last_second = Some(sample.second);
            if is_listening_to_ticks.load(Ordering::Relaxed) {
                println!("<-- [TICK] {}", sample.formatted);
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let config = ChimeClockConfig::load(DEFAULT_CONFIG_FILE)?;
    let engine = ChimeClockEngine::new(config);

    // Create the shared flag for the tick listener.
    let is_listening_to_ticks = Arc::new(AtomicBool::new(false));
    spawn_event_listeners(&engine, is_listening_to_ticks.clone());

    info!("Starting the {} in the background...", ENGINE_NAME.cyan());
    let handle = engine.spawn();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ShellHighlighter));

    println!("{} is running. Type 'help' for commands or 'exit' to quit.", ENGINE_NAME.cyan());

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting chimeshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;

        match Command::parse(&line) {
            Command::Status => print_status(&engine),
            Command::Show => print_frame(&engine),
            Command::Orient(orientation) => {
                engine.set_orientation(orientation);
                println!("--> Orientation is now {}.", orientation);
            }
            Command::Rotate => {
                let orientation = engine.rotate();
                println!("--> Rotated to {}.", orientation);
            }
            Command::Ticks(on) => {
                is_listening_to_ticks.store(on, Ordering::Relaxed);
                if on {
                    println!("--> Started printing the time.");
                } else {
                    println!("--> Stopped printing the time.");
                }
            }
            Command::Help => print_help(),
            Command::Exit => break,
            Command::Empty => {}
            Command::Unknown(line) => println!("Unknown command: '{}'. Type 'help'.", line),
        }

        if handle.is_finished() {
            println!("--> The clock has stopped.");
            break;
        }
    }

    handle.stop().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_orientation_reports() {
        assert_eq!(Command::parse("portrait"), Command::Orient(Orientation::Portrait));
        assert_eq!(Command::parse("  landscape "), Command::Orient(Orientation::Landscape));
        assert_eq!(Command::parse("rotate"), Command::Rotate);
    }

    #[test]
    fn parses_two_word_commands() {
        assert_eq!(Command::parse("start ticks"), Command::Ticks(true));
        assert_eq!(Command::parse("stop ticks"), Command::Ticks(false));
        assert_eq!(
            Command::parse("stop everything"),
            Command::Unknown("stop everything".to_string())
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("quit"), Command::Exit);
    }
}
