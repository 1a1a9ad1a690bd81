use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rewind_history::config::resolve_config_path;
use rewind_history::{HistoryTracker, TrackerConfig};

mod commands;

use commands::Command;

/// Interactive shell for a text value with undo/redo history.
#[derive(Parser, Debug)]
#[command(name = "rewind", version, about)]
struct Cli {
    /// Config file to load (defaults to REWIND_CONFIG or the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum history entries to keep.
    #[arg(long)]
    capacity: Option<usize>,

    /// Quiet period in milliseconds before a change is recorded.
    #[arg(long)]
    debounce: Option<u64>,

    /// Initial text.
    #[arg(long, default_value = "")]
    initial: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(resolve_config_path);
    let mut config = TrackerConfig::load_or_default(&config_path);
    if let Some(capacity) = cli.capacity {
        config = config.with_capacity(capacity);
    }
    if let Some(debounce) = cli.debounce {
        config = config.with_debounce_ms(debounce);
    }

    tracing::info!(
        "Starting rewind (capacity {}, debounce {} ms)",
        config.capacity,
        config.debounce_ms
    );

    let mut tracker = HistoryTracker::with_value(cli.initial, config);
    run_shell(&mut tracker)?;

    let cell = tracker.dispose();
    tracing::info!("Final value: {:?}", cell.get());
    Ok(())
}

fn run_shell(tracker: &mut HistoryTracker<String>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "rewind> ").context("Failed to write prompt")?;
        stdout.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            break;
        }

        // Debounced changes may have come due while waiting for input.
        tracker.pump();

        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(stdout, "error: {e:#}")?;
                continue;
            }
        };
        let quit = cmd == Command::Quit;

        match commands::execute(tracker, cmd) {
            Ok(out) if out.is_empty() => {}
            Ok(out) => writeln!(stdout, "{out}")?,
            Err(e) => writeln!(stdout, "error: {e:#}")?,
        }
        if quit {
            break;
        }
    }
    Ok(())
}
