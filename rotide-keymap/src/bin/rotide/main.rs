//! Entry point for the rotide binary.
//!
//! Puts the terminal in raw mode and feeds each key event to the dispatch
//! engine. The status line is painted on the bottom row unless configured
//! otherwise; text typed in insert mode is echoed back when the session ends.

mod args;
mod input;
mod tracing_setup;

use std::io::{self, Write};

use anyhow::Result;
use crossterm::event::KeyEvent;
use crossterm::terminal;
use rotide_keymap::key::CTRL_C;
use rotide_keymap::{AnsiSink, Builtins, Engine, RotideConfig, StatusSink};

fn main() -> Result<()> {
    let args = args::parse_args();

    let loaded = match &args.config {
        Some(path) => RotideConfig::load_from(path),
        None => RotideConfig::load_default(),
    };
    let mut config = loaded.unwrap_or_else(|err| {
        eprintln!("Warning: failed to load rotide.toml: {err}");
        eprintln!("Using default configuration");
        RotideConfig::default()
    });
    if let Some(path) = args.log {
        config = config.with_log_file(path);
    }

    if let Some(path) = tracing_setup::init(&config.logging) {
        eprintln!("Logging to {}", path.display());
    }

    log::info!("Starting rotide");

    let row = config
        .engine
        .status_row
        .or_else(|| terminal::size().ok().map(|(_, rows)| rows));
    let mut sink = AnsiSink::new(io::stdout());
    if let Some(row) = row {
        sink = sink.at_row(row);
    }
    let mut engine = Engine::with_config(&config.engine, sink)?;

    // Handlers must outlive the engine that refers to them.
    let builtins = Builtins::new();
    builtins.install(&mut engine, &Builtins::merged_keys(&config.keys)?)?;

    let raw_mode = input::RawMode::enable()?;
    let text = run(&mut engine, &builtins, input::key_events());
    engine.sink_mut().clear_status();
    drop(raw_mode);
    let text = text?;

    log::info!(
        "Exiting rotide after {} resolved sequence(s)",
        engine.history().len()
    );

    if !text.is_empty() {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
    }
    Ok(())
}

/// Dispatch key events until they end, `Ctrl+C` arrives, or the `quit`
/// command runs. Returns the literal text typed in insert mode.
fn run<S, I>(engine: &mut Engine<S>, builtins: &Builtins, events: I) -> Result<String>
where
    S: StatusSink,
    I: IntoIterator<Item = io::Result<KeyEvent>>,
{
    let mut text = String::new();

    for event in events {
        let Some(key) = input::translate(&event?) else {
            continue;
        };
        if key == CTRL_C {
            log::info!("Interrupted");
            break;
        }

        let outcome = engine.dispatch(key);
        if let Some(keys) = outcome.literal_keys() {
            text.extend(keys.iter().filter_map(|key| key.as_char()));
        }

        if builtins.quit_requested() {
            break;
        }
    }

    Ok(text)
}
